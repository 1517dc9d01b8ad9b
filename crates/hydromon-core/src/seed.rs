use anyhow::Result;
use sqlx::postgres::PgQueryResult;
use tracing::info;

use crate::db::DbPool;

#[derive(Debug)]
struct DomainSeed {
    name: &'static str,
    field_type: &'static str,
    description: &'static str,
    values: &'static [&'static str],
}

static DOMAIN_SEEDS: &[DomainSeed] = &[
    DomainSeed {
        name: "Yes/No",
        field_type: "TEXT",
        description: "Boolean flag stored as text",
        values: &["Yes", "No"],
    },
    DomainSeed {
        name: "Battery Condition",
        field_type: "TEXT",
        description: "Condition of a data logger battery at a site visit",
        values: &["Good", "Poor"],
    },
    DomainSeed {
        name: "Data Logger Type",
        field_type: "TEXT",
        description: "Recorder models deployed in the network",
        values: &[
            "CR1000X",
            "CR300",
            "CR200X",
            "Sutron XLink 500",
            "Waterlog H-500XL",
        ],
    },
    DomainSeed {
        name: "Sensor Type",
        field_type: "TEXT",
        description: "Sensor models deployed in the network",
        values: &["TE525", "PT12", "CS451", "CS547A", "SL-1000"],
    },
    DomainSeed {
        name: "Location Issue Type",
        field_type: "TEXT",
        description: "Problems and notes recorded at a location during a visit",
        values: &[
            "Battery swap",
            "Equipment - Device or SIM changed",
            "Equipment - Failure / unable to connect",
            "Equipment - In-Situ low battery",
            "Equipment - None installed",
            "Equipment - Solar panel",
            "Follow up - Maintenance required next visit",
            "Follow up - Issues resolved",
            "Invalid data",
            "Inventory verification",
            "MP - Inaccessible due to high water",
            "MP - Missing (washed away, etc.)",
            "MP - New",
            "MP - No water at MP",
            "No access",
            "Photo - Site / MP",
            "Vandalism",
            "Other issue",
            "General note",
        ],
    },
    DomainSeed {
        name: "Battery Replacement Exception",
        field_type: "TEXT",
        description: "Reason a due battery replacement was not done",
        values: &["No materials", "Has solar panel", "Other"],
    },
    DomainSeed {
        name: "Dessicant Maintenance",
        field_type: "TEXT",
        description: "State of the dessicant in an enclosure or tube",
        values: &["Verified", "Replaced", "Needs replacement - No materials", "Other"],
    },
    DomainSeed {
        name: "Groundwater Adjustment Exception",
        field_type: "TEXT",
        description: "Reason a groundwater sensor adjustment was skipped",
        values: &[
            "Before water quality sample",
            "Low conductivity",
            "Time",
            "Weather",
            "Other",
        ],
    },
    DomainSeed {
        name: "Conductivity Adjustment Exception",
        field_type: "TEXT",
        description: "Reason a conductivity sensor adjustment was skipped",
        values: &[
            "Missing standard",
            "Sensor failed",
            "Time",
            "Unable to pull sensor",
            "Other",
        ],
    },
    DomainSeed {
        name: "Reading Type",
        field_type: "TEXT",
        description: "Why a manual reading was taken",
        values: &[
            "Routine",
            "Routine before",
            "Routine after",
            "After calibration",
            "Reset before",
            "Reset after",
            "Cleaning before",
            "Cleaning after",
            "Other",
        ],
    },
    DomainSeed {
        name: "Rainfall Exception",
        field_type: "TEXT",
        description: "Reason a rain gauge check was skipped",
        values: &["No ladder", "Raining", "Other"],
    },
    DomainSeed {
        name: "Stage Adjustment Exception",
        field_type: "TEXT",
        description: "Reason a stage adjustment was skipped",
        values: &["Environmental", "Safety", "Time", "Weather", "Wind", "Other"],
    },
    DomainSeed {
        name: "Temperature Source",
        field_type: "TEXT",
        description: "Instrument a temperature reading came from",
        values: &["ADVM", "Conductivity", "Transducer"],
    },
    DomainSeed {
        name: "Time Adjustment Type",
        field_type: "TEXT",
        description: "Kind of logger clock correction",
        values: &["Drift", "Clock default"],
    },
    DomainSeed {
        name: "Conductivity Standard",
        field_type: "LONG",
        description: "Calibration standard in microsiemens per centimetre",
        values: &["1", "10", "100", "1000"],
    },
];

/// Domains the location loader writes through; a target without them
/// would reject every data logger and sensor.
pub const EQUIPMENT_DOMAINS: &[&str] = &["Data Logger Type", "Sensor Type"];

pub fn domain_names() -> impl Iterator<Item = &'static str> {
    DOMAIN_SEEDS.iter().map(|seed| seed.name)
}

/// Upserts every coded-value domain and its values. Safe to re-run.
pub async fn run(pool: &DbPool) -> Result<()> {
    for domain in DOMAIN_SEEDS {
        let result: PgQueryResult = sqlx::query::<sqlx::Postgres>(
            r#"
            INSERT INTO coded_value_domain (name, field_type, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name)
            DO UPDATE SET field_type = EXCLUDED.field_type, description = EXCLUDED.description
            "#,
        )
        .bind(domain.name)
        .bind(domain.field_type)
        .bind(domain.description)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(domain = domain.name, "Seeded coded value domain");
        }

        for value in domain.values {
            sqlx::query::<sqlx::Postgres>(
                r#"
                INSERT INTO coded_value (domain_name, code, description)
                VALUES ($1, $2, $2)
                ON CONFLICT (domain_name, code)
                DO UPDATE SET description = EXCLUDED.description
                "#,
            )
            .bind(domain.name)
            .bind(*value)
            .execute(pool)
            .await?;
        }
    }
    Ok(())
}
