//! Paced terminal rendering of a state's socioeconomic profile.

use crate::db::StateAggregate;
use std::time::Duration;
use tokio::time::sleep;

const LINE_DELAY: Duration = Duration::from_secs(1);

/// Print the profile one line at a time, pausing between lines.
pub async fn print_state_profile(state: &StateAggregate) {
    println!("Here is socioeconomic data for {}:", state.name);
    for line in [
        format!("Population: {}", state.population),
        format!("Median Household Income: {}", state.median_income),
        format!("Unemployment Rate: {}", state.unemployment_rate),
        format!("Poverty Rate: {}", state.poverty_rate),
        format!("College Completion Rate: {}", state.college_rate),
        format!("Completed High School Only Rate: {}", state.hs_only_rate),
    ] {
        sleep(LINE_DELAY).await;
        println!("{line}");
    }
}
