use chrono::NaiveDate;
use clap::Subcommand;
use moonbell_core::storage::{SentDb, SentStore};
use serde_json::json;

#[derive(Subcommand)]
pub enum SentAction {
    /// List recent sent-reminder records
    List {
        #[arg(long, default_value = "20")]
        limit: u32,
    },
    /// Remove records with an occurrence date before YYYY-MM-DD
    Prune { before: String },
}

pub fn run(action: SentAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = SentDb::open()?;
    match action {
        SentAction::List { limit } => {
            let records: Vec<serde_json::Value> = db
                .list_recent(limit)?
                .iter()
                .map(|r| {
                    json!({
                        "event_uid": r.event_uid,
                        "offset": r.offset,
                        "occurrence_date": r.occurrence_date,
                        "sent_at": r.sent_at,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        SentAction::Prune { before } => {
            let before = NaiveDate::parse_from_str(&before, "%Y-%m-%d")?;
            let removed = db.prune_before(before)?;
            println!("removed {removed} records");
        }
    }
    Ok(())
}
