use std::path::Path;

use checkin_core::search::filter_attendees;
use checkin_core::EventId;

use crate::commands::common::{attendee_to_item, format_attendee_line, open_cache, AttendeeItem};
use crate::error::CliError;

pub async fn run_search(
    query: Option<&str>,
    limit: usize,
    as_json: bool,
    event: &EventId,
    db_path: &Path,
) -> Result<(), CliError> {
    let cache = open_cache(event, db_path).await?;
    let Some(roster) = cache.load_roster().await? else {
        return Err(CliError::NotLoaded(event.clone()));
    };

    let matches = filter_attendees(&roster, query.unwrap_or(""));

    if as_json {
        let json_items = matches
            .iter()
            .take(limit)
            .map(|attendee| attendee_to_item(attendee))
            .collect::<Vec<AttendeeItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No attendees found.");
        return Ok(());
    }

    for attendee in matches.iter().take(limit) {
        println!("{}", format_attendee_line(attendee));
    }
    if matches.len() > limit {
        println!("... {} more", matches.len() - limit);
    }
    Ok(())
}
