//! SQLite persistence.
//!
//! Tables are rebuilt wholesale on every run: drop, recreate, bulk-insert
//! from the scrape/extract outputs. Surrogate keys only; the place name
//! is the join column between the covid and socioeconomic tables.

use crate::extract::county::CountyRow;
use crate::fetch::npr::StateCounts;
use crate::merge::SocioRecord;
use rusqlite::{params, Connection, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "opening database");
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Drop and recreate every table.
    pub fn reset_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            DROP TABLE IF EXISTS covid_county;
            DROP TABLE IF EXISTS covid_state;
            DROP TABLE IF EXISTS socioeconomic_state;
            DROP TABLE IF EXISTS socioeconomic_michigan;

            CREATE TABLE covid_county (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                county TEXT NOT NULL,
                state TEXT NOT NULL,
                fips INTEGER,
                cases INTEGER NOT NULL,
                deaths INTEGER
            );

            CREATE TABLE covid_state (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                cases INTEGER NOT NULL,
                deaths INTEGER NOT NULL
            );

            CREATE TABLE socioeconomic_state (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                population INTEGER NOT NULL,
                median_income INTEGER NOT NULL,
                poverty_rate REAL NOT NULL,
                unemployment_rate REAL NOT NULL,
                hs_only_rate REAL NOT NULL,
                college_rate REAL NOT NULL
            );

            CREATE TABLE socioeconomic_michigan (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                county TEXT NOT NULL,
                population INTEGER NOT NULL,
                median_income INTEGER NOT NULL,
                poverty_rate REAL NOT NULL,
                unemployment_rate REAL NOT NULL,
                hs_only_rate REAL NOT NULL,
                college_rate REAL NOT NULL
            );
            "#,
        )
    }

    pub fn insert_county_rows(&mut self, rows: &[CountyRow]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO covid_county (date, county, state, fips, cases, deaths)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.date.to_string(),
                    row.county,
                    row.state,
                    row.fips,
                    row.cases,
                    row.deaths,
                ])?;
            }
        }
        tx.commit()?;
        info!(rows = rows.len(), "county rows inserted");
        Ok(())
    }

    pub fn insert_state_counts(&mut self, counts: &BTreeMap<String, StateCounts>) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO covid_state (name, cases, deaths) VALUES (?, ?, ?)")?;
            for (name, counts) in counts {
                stmt.execute(params![name, counts.cases, counts.deaths])?;
            }
        }
        tx.commit()?;
        info!(rows = counts.len(), "state counts inserted");
        Ok(())
    }

    pub fn insert_state_socio(&mut self, records: &BTreeMap<String, SocioRecord>) -> Result<()> {
        Self::insert_socio(&mut self.conn, "socioeconomic_state", "name", records)?;
        info!(rows = records.len(), "state socioeconomic rows inserted");
        Ok(())
    }

    pub fn insert_michigan_socio(&mut self, records: &BTreeMap<String, SocioRecord>) -> Result<()> {
        Self::insert_socio(&mut self.conn, "socioeconomic_michigan", "county", records)?;
        info!(rows = records.len(), "Michigan socioeconomic rows inserted");
        Ok(())
    }

    fn insert_socio(
        conn: &mut Connection,
        table: &str,
        place_column: &str,
        records: &BTreeMap<String, SocioRecord>,
    ) -> Result<()> {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {table} ({place_column}, population, median_income,
                     poverty_rate, unemployment_rate, hs_only_rate, college_rate)
                 VALUES (?, ?, ?, ?, ?, ?, ?)"
            ))?;
            for (place, record) in records {
                stmt.execute(params![
                    place,
                    record.population,
                    record.median_income,
                    record.poverty_rate,
                    record.unemployment_rate,
                    record.hs_only_rate,
                    record.college_rate,
                ])?;
            }
        }
        tx.commit()
    }

    /// Per-county maxima within one state, ordered by case count
    /// descending.
    pub fn counties_for_state(&self, state: &str) -> Result<Vec<CountyAggregate>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT county, MAX(cases), MAX(deaths)
            FROM covid_county
            WHERE state = ?
            GROUP BY county
            ORDER BY MAX(cases) DESC
            "#,
        )?;
        let rows = stmt.query_map([state], |row| {
            Ok(CountyAggregate {
                county: row.get(0)?,
                cases: row.get(1)?,
                deaths: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
            })
        })?;
        rows.collect()
    }

    /// Per-state maxima joined to the socioeconomic table on name
    /// equality, ordered by case count descending.
    pub fn national(&self) -> Result<Vec<StateAggregate>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT cs.name, MAX(cs.cases), MAX(cs.deaths),
                   ss.population, ss.median_income, ss.unemployment_rate,
                   ss.poverty_rate, ss.college_rate, ss.hs_only_rate
            FROM covid_state AS cs
                JOIN socioeconomic_state AS ss ON cs.name = ss.name
            GROUP BY cs.name
            ORDER BY MAX(cs.cases) DESC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StateAggregate {
                name: row.get(0)?,
                cases: row.get(1)?,
                deaths: row.get(2)?,
                population: row.get(3)?,
                median_income: row.get(4)?,
                unemployment_rate: row.get(5)?,
                poverty_rate: row.get(6)?,
                college_rate: row.get(7)?,
                hs_only_rate: row.get(8)?,
            })
        })?;
        rows.collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountyAggregate {
    pub county: String,
    pub cases: i64,
    pub deaths: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateAggregate {
    pub name: String,
    pub cases: i64,
    pub deaths: i64,
    pub population: i64,
    pub median_income: i64,
    pub unemployment_rate: f64,
    pub poverty_rate: f64,
    pub college_rate: f64,
    pub hs_only_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::county::parse_county_rows;

    fn record(population: i64) -> SocioRecord {
        SocioRecord {
            population,
            median_income: 50_000,
            poverty_rate: 10.0,
            unemployment_rate: 4.0,
            hs_only_rate: 25.0,
            college_rate: 30.0,
        }
    }

    fn seeded_store() -> Store {
        let mut store = Store::open_in_memory().unwrap();
        store.reset_schema().unwrap();

        let csv = "\
date,county,state,fips,cases,deaths
2020-04-30,Washtenaw,Michigan,26161,900,40
2020-05-01,Washtenaw,Michigan,26161,1000,50
2020-05-01,Wayne,Michigan,26163,8000,900
2020-05-01,Travis,Texas,48453,2000,40
";
        let rows = parse_county_rows(csv.as_bytes()).unwrap();
        store.insert_county_rows(&rows).unwrap();

        let counts = BTreeMap::from([
            (
                "Michigan".to_string(),
                StateCounts {
                    cases: 58_999,
                    deaths: 5_673,
                },
            ),
            (
                "Texas".to_string(),
                StateCounts {
                    cases: 64_000,
                    deaths: 1_600,
                },
            ),
        ]);
        store.insert_state_counts(&counts).unwrap();

        let socio = BTreeMap::from([
            ("Michigan".to_string(), record(9_986_857)),
            ("Texas".to_string(), record(28_995_881)),
        ]);
        store.insert_state_socio(&socio).unwrap();
        store.insert_michigan_socio(&socio).unwrap();
        store
    }

    #[test]
    fn counties_report_maxima_ordered_by_cases() {
        let store = seeded_store();
        let counties = store.counties_for_state("Michigan").unwrap();
        assert_eq!(counties.len(), 2);
        assert_eq!(counties[0].county, "Wayne");
        assert_eq!(counties[0].cases, 8000);
        assert_eq!(counties[1].county, "Washtenaw");
        assert_eq!(counties[1].cases, 1000);
        assert_eq!(counties[1].deaths, 50);
    }

    #[test]
    fn unknown_state_yields_no_rows() {
        let store = seeded_store();
        assert!(store.counties_for_state("Atlantis").unwrap().is_empty());
    }

    #[test]
    fn national_joins_socioeconomic_data_by_name() {
        let store = seeded_store();
        let national = store.national().unwrap();
        assert_eq!(national.len(), 2);
        assert_eq!(national[0].name, "Texas");
        assert_eq!(national[0].cases, 64_000);
        assert_eq!(national[0].population, 28_995_881);
        assert_eq!(national[1].name, "Michigan");
        assert_eq!(national[1].median_income, 50_000);
    }

    #[test]
    fn reset_schema_discards_previous_rows() {
        let mut store = seeded_store();
        store.reset_schema().unwrap();
        assert!(store.counties_for_state("Michigan").unwrap().is_empty());
        assert!(store.national().unwrap().is_empty());

        // tables are writable again after the rebuild
        let counts = BTreeMap::from([(
            "Ohio".to_string(),
            StateCounts {
                cases: 1,
                deaths: 0,
            },
        )]);
        store.insert_state_counts(&counts).unwrap();
    }
}
