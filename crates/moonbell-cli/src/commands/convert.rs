use chrono::NaiveDate;
use clap::Subcommand;
use moonbell_core::lunar::{self, LunarDate};
use serde_json::json;

#[derive(Subcommand)]
pub enum ConvertAction {
    /// Convert a solar date (YYYY-MM-DD) to lunar
    ToLunar { date: String },
    /// Convert a lunar date to solar
    ToSolar {
        year: i32,
        month: u32,
        day: u32,
        /// The date lies in the year's leap month
        #[arg(long)]
        leap: bool,
    },
}

pub fn run(action: ConvertAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConvertAction::ToLunar { date } => {
            let solar = NaiveDate::parse_from_str(&date, "%Y-%m-%d")?;
            let lunar = lunar::solar_to_lunar(solar)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "solar": solar.to_string(),
                    "lunar": {
                        "year": lunar.year,
                        "month": lunar.month,
                        "day": lunar.day,
                        "is_leap_month": lunar.is_leap_month,
                    },
                    "display": lunar.to_string(),
                }))?
            );
        }
        ConvertAction::ToSolar {
            year,
            month,
            day,
            leap,
        } => {
            let lunar = LunarDate::new(year, month, day, leap);
            let solar = lunar::lunar_to_solar(&lunar)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "lunar": lunar.to_string(),
                    "solar": solar.to_string(),
                }))?
            );
        }
    }
    Ok(())
}
