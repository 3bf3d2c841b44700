//! Report aggregation and competitive grading
//!
//! [`aggregate`] is the only place that knows the full shape of an audit.
//! It does no I/O; everything it needs has already been fetched and parsed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::content::ContentScore;
use crate::domain::DomainProfile;
use crate::markup::PageMarkup;
use crate::performance::PerformanceMetrics;
use crate::robots::RobotsPolicy;
use crate::sitemap::SitemapDiscovery;
use crate::subpages::SubpageAudit;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    /// A: both ≥80; B: both ≥70; C: either ≥60; otherwise D.
    pub fn from_scores(performance: u8, seo: u8) -> Self {
        if performance >= 80 && seo >= 80 {
            Self::A
        } else if performance >= 70 && seo >= 70 {
            Self::B
        } else if performance >= 60 || seo >= 60 {
            Self::C
        } else {
            Self::D
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        f.write_str(letter)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompetitiveAssessment {
    pub grade: Grade,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Output of every analyzer for one audit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Findings {
    #[serde(flatten)]
    pub markup: PageMarkup,
    pub robots: RobotsPolicy,
    pub sitemaps: SitemapDiscovery,
    pub subpages: SubpageAudit,
    pub content: ContentScore,
    pub domain: DomainProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteStructure {
    /// Meta robots and robots.txt both allow indexing the page
    pub robots_allowed: bool,
    #[serde(flatten)]
    pub findings: Findings,
}

/// The finished audit handed to advice and delivery collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub id: Uuid,
    pub url: String,
    pub generated_at: DateTime<Utc>,
    pub metrics: PerformanceMetrics,
    pub structure: SiteStructure,
    pub assessment: CompetitiveAssessment,
    /// Free-form recommendations from the advice step, when one ran
    pub advice: Option<String>,
}

impl Report {
    pub fn with_advice(mut self, advice: impl Into<String>) -> Self {
        self.advice = Some(advice.into());
        self
    }

    pub fn grade(&self) -> Grade {
        self.assessment.grade
    }
}

/// Fixed threshold checks behind the strength and weakness bullets.
pub fn assess(metrics: &PerformanceMetrics, structure: &SiteStructure) -> CompetitiveAssessment {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if metrics.performance >= 70 {
        strengths.push(format!("Good page performance ({})", metrics.performance));
    } else {
        weaknesses.push(format!("Page performance needs work ({})", metrics.performance));
    }

    if metrics.seo >= 80 {
        strengths.push(format!("Strong technical SEO ({})", metrics.seo));
    } else if metrics.seo < 60 {
        weaknesses.push(format!("Low technical SEO score ({})", metrics.seo));
    }

    let h1_count = structure.findings.markup.facts.h1_count;
    if h1_count == 1 {
        strengths.push("Exactly one H1 heading".to_string());
    } else {
        weaknesses.push(format!("Expected one H1 heading, found {h1_count}"));
    }

    if structure.findings.content.readability_score >= 70 {
        strengths.push(format!(
            "Easy-to-read content (readability {})",
            structure.findings.content.readability_score
        ));
    }

    if !structure.robots_allowed {
        weaknesses.push("Page is blocked from indexing".to_string());
    }

    CompetitiveAssessment {
        grade: Grade::from_scores(metrics.performance, metrics.seo),
        strengths,
        weaknesses,
    }
}

/// Combine every analyzer's output and the external metrics into a report.
pub fn aggregate(url: &Url, metrics: PerformanceMetrics, findings: Findings) -> Report {
    let metrics = metrics.clamped();
    let structure = SiteStructure {
        robots_allowed: findings.markup.facts.meta_robots_allows_indexing
            && findings.robots.allows_indexing,
        findings,
    };
    let assessment = assess(&metrics, &structure);

    Report {
        id: Uuid::new_v4(),
        url: url.to_string(),
        generated_at: Utc::now(),
        metrics,
        structure,
        assessment,
        advice: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::analyze_content;
    use crate::markup::extract_markup;
    use crate::robots::parse_robots_txt;

    fn findings(html: &str, robots: &str) -> Findings {
        let url = Url::parse("https://example.com/").unwrap();
        let markup = extract_markup(html, &url);
        let content = analyze_content(
            &markup.facts.title,
            &markup.facts.meta_description,
            &markup.facts.body_text,
        );
        Findings {
            robots: parse_robots_txt(robots, &url),
            sitemaps: SitemapDiscovery::default(),
            subpages: SubpageAudit::default(),
            content,
            domain: DomainProfile::from_url(&url),
            markup,
        }
    }

    fn metrics(performance: u8, seo: u8) -> PerformanceMetrics {
        PerformanceMetrics {
            performance,
            seo,
            ..PerformanceMetrics::default()
        }
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(Grade::from_scores(80, 80), Grade::A);
        assert_eq!(Grade::from_scores(95, 79), Grade::B);
        assert_eq!(Grade::from_scores(70, 70), Grade::B);
        assert_eq!(Grade::from_scores(69, 10), Grade::C);
        assert_eq!(Grade::from_scores(10, 60), Grade::C);
        assert_eq!(Grade::from_scores(59, 59), Grade::D);
    }

    #[test]
    fn test_robots_allowed_combines_meta_and_robots_txt() {
        let url = Url::parse("https://example.com/").unwrap();
        let indexable = "<html><head><title>Home</title></head><body><h1>Hi</h1></body></html>";
        let noindex = r#"<head><meta name="robots" content="noindex"></head><body><h1>Hi</h1></body>"#;

        let report = aggregate(&url, metrics(90, 90), findings(indexable, ""));
        assert!(report.structure.robots_allowed);

        let report = aggregate(&url, metrics(90, 90), findings(noindex, ""));
        assert!(!report.structure.robots_allowed);
        assert!(report.assessment.weaknesses.iter().any(|w| w.contains("blocked")));

        let report = aggregate(&url, metrics(90, 90), findings(indexable, "User-agent: *\nDisallow: /"));
        assert!(!report.structure.robots_allowed);
    }

    #[test]
    fn test_assessment_bullets() {
        let url = Url::parse("https://example.com/").unwrap();
        let html = "<body><h1>One</h1><h1>Two</h1><p>Short text.</p></body>";

        let report = aggregate(&url, metrics(75, 50), findings(html, ""));
        assert_eq!(report.grade(), Grade::C);
        assert!(report.assessment.strengths.iter().any(|s| s.contains("performance")));
        assert!(report.assessment.weaknesses.iter().any(|w| w.contains("SEO")));
        assert!(report.assessment.weaknesses.iter().any(|w| w.contains("found 2")));
        assert!(report.advice.is_none());

        let report = report.with_advice("Add a meta description.");
        assert_eq!(report.advice.as_deref(), Some("Add a meta description."));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let url = Url::parse("https://example.com/").unwrap();
        let report = aggregate(&url, metrics(80, 80), findings("<h1>x</h1>", ""));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["url"], "https://example.com/");
        assert_eq!(json["assessment"]["grade"], "A");
        assert_eq!(json["metrics"]["bestPractices"], 0);
        assert!(json["structure"]["robots"].is_object());
        assert!(json["structure"]["open_graph"].is_object());
        assert!(json["advice"].is_null());
    }
}
