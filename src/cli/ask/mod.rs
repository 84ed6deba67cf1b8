//! Ask command - one-shot answer

use std::path::PathBuf;
use clap::Args;
use tracing::info;

use crate::infrastructure::services::{Answer, AnswerSource};

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Query to answer
    pub query: String,

    /// Snapshot to warm from and save back to (overrides `snapshot.path`)
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Print the full answer as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let service = crate::build_response_service(&config)?;
    let snapshot = args.snapshot.or_else(|| config.snapshot.path.clone());

    if let Some(path) = &snapshot {
        service.restore_snapshot(path).await?;
    }

    let answer = service.answer(&args.query).await?;
    info!(source = ?answer.source, confidence = answer.confidence, "Answered");

    if let Some(path) = &snapshot {
        if answer.recorded.is_some() {
            service.save_snapshot(path).await?;
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        println!("{}", render(&answer));
    }

    Ok(())
}

fn render(answer: &Answer) -> String {
    let source = match answer.source {
        AnswerSource::Cached { level } => format!("cache:{}", level),
        AnswerSource::Generated => "generated".to_string(),
    };

    format!("{}\n[{} confidence={:.2}]", answer.text, source, answer.confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheLevel;

    #[test]
    fn test_render_cached() {
        let answer = Answer {
            text: "Paris.".to_string(),
            confidence: 0.9,
            source: AnswerSource::Cached {
                level: CacheLevel::Word,
            },
            recorded: None,
        };

        assert_eq!(render(&answer), "Paris.\n[cache:word confidence=0.90]");
    }

    #[test]
    fn test_render_generated() {
        let answer = Answer {
            text: "Hi".to_string(),
            confidence: 0.5,
            source: AnswerSource::Generated,
            recorded: None,
        };

        assert!(render(&answer).ends_with("[generated confidence=0.50]"));
    }
}
