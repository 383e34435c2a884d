//! Helpers for rendering a generation run for terminals and scripts

use crate::generator::{FontSource, GenerationReport, GenerationStatus, Verification};
use serde_json::{Value, json};

/// Combined structured and human-readable representation of a run
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// Structured JSON representation suitable for downstream consumers
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Render a report, plus read-back results when `--verify` was requested.
pub fn render_report(report: &GenerationReport, verifications: Option<&[Verification]>) -> RenderedReport {
    let mut human = Vec::new();

    match report.status {
        GenerationStatus::Completed => human.push(format!(
            "Done! {} QR codes generated in: {}",
            report.completed,
            report.output_dir.display()
        )),
        GenerationStatus::Cancelled => human.push(format!(
            "Generation cancelled after {} of {} tables",
            report.completed, report.requested
        )),
    }
    human.push(format!("  Font: {}", font_label(&report.font)));

    let mut json = json!({
        "status": report.status,
        "completed": report.completed,
        "requested": report.requested,
        "output_dir": report.output_dir,
        "font": report.font,
        "files": report.files,
    });

    if let Some(verifications) = verifications {
        let failed: Vec<&Verification> = verifications.iter().filter(|v| !v.is_match()).collect();
        human.push(format!(
            "  Verified: {}/{} read back correctly",
            verifications.len() - failed.len(),
            verifications.len()
        ));
        for v in &failed {
            let reason = v
                .error
                .clone()
                .or_else(|| v.decoded.as_ref().map(|d| format!("decoded '{d}'")))
                .unwrap_or_default();
            human.push(format!("    table {}: {reason}", v.table));
        }

        if let Some(obj) = json.as_object_mut() {
            obj.insert(
                "verification".to_string(),
                json!({
                    "checked": verifications.len(),
                    "failed": failed,
                }),
            );
        }
    }

    RenderedReport { json, human }
}

fn font_label(font: &FontSource) -> String {
    match font {
        FontSource::Configured(path) => path.display().to_string(),
        FontSource::FallbackBitmap => "built-in bitmap digits".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report(status: GenerationStatus, completed: u32) -> GenerationReport {
        GenerationReport {
            status,
            completed,
            requested: 3,
            output_dir: PathBuf::from("out"),
            font: FontSource::FallbackBitmap,
            files: (1..=completed).map(|t| PathBuf::from(format!("out/{t}.png"))).collect(),
        }
    }

    #[test]
    fn completed_summary() {
        let rendered = render_report(&report(GenerationStatus::Completed, 3), None);
        assert_eq!(rendered.human[0], "Done! 3 QR codes generated in: out");
        assert_eq!(rendered.json["status"], "completed");
        assert_eq!(rendered.json["font"]["kind"], "fallback_bitmap");
        assert_eq!(rendered.json["files"].as_array().map(Vec::len), Some(3));
        assert!(rendered.json.get("verification").is_none());
    }

    #[test]
    fn cancelled_summary() {
        let rendered = render_report(&report(GenerationStatus::Cancelled, 1), None);
        assert_eq!(rendered.human[0], "Generation cancelled after 1 of 3 tables");
        assert_eq!(rendered.json["completed"], 1);
    }

    #[test]
    fn verification_failures_are_listed() {
        let checks = vec![
            Verification {
                table: 1,
                path: PathBuf::from("out/1.png"),
                expected: "https://a/1".to_string(),
                decoded: Some("https://a/1".to_string()),
                error: None,
            },
            Verification {
                table: 2,
                path: PathBuf::from("out/2.png"),
                expected: "https://a/2".to_string(),
                decoded: None,
                error: Some("No QR code found in image".to_string()),
            },
        ];
        let rendered = render_report(&report(GenerationStatus::Completed, 2), Some(&checks));
        assert!(rendered.human.contains(&"  Verified: 1/2 read back correctly".to_string()));
        assert!(rendered.human.contains(&"    table 2: No QR code found in image".to_string()));
        assert_eq!(rendered.json["verification"]["checked"], 2);
        assert_eq!(rendered.json["verification"]["failed"][0]["table"], 2);
    }
}
