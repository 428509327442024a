use serde::Serialize;
use sqlx::PgPool;

use crate::model::{Holder, SimTimestamp, World};

/// Archive an entire `World` into Postgres using COPY FROM STDIN (text format).
///
/// Order respects FK constraints:
/// citizens → buildings → contracts → resource_stacks → activities → stratagems.
pub async fn archive_world(pool: &PgPool, world: &World) -> Result<(), sqlx::Error> {
    // Citizens
    {
        let mut buf = String::new();
        for c in world.citizens.values() {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                c.id,
                escape(&c.name),
                c.ducats,
                c.position.lat,
                c.position.lng,
                opt_u64(c.home),
                opt_str(c.district.as_deref()),
                escape(&json_str(&c.trust)),
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_citizens.sql"), &buf).await?;
    }

    // Buildings (after citizens due to owner FK)
    {
        let mut buf = String::new();
        for b in world.buildings.values() {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                b.id,
                escape(&b.name),
                b.position.lat,
                b.position.lng,
                opt_str(b.district.as_deref()),
                opt_u64(b.owner),
                b.is_galley,
                b.construction_minutes_remaining,
                escape(&json_str(&b.construction_materials)),
                b.crime_pressure,
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_buildings.sql"), &buf).await?;
    }

    // Contracts (before activities due to FK)
    {
        let mut buf = String::new();
        for c in world.contracts.values() {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                c.id,
                escape(&enum_str(&c.kind)),
                c.buyer,
                c.seller,
                opt_u64(c.asset),
                opt_str(c.resource.as_deref()),
                c.price_per_unit,
                c.target_amount,
                c.delivered,
                escape(&enum_str(&c.status)),
                ts(c.created_at),
                escape(&json_str(&c.notes)),
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_contracts.sql"), &buf).await?;
    }

    // Resource stacks
    {
        let mut buf = String::new();
        for s in world.stacks.values() {
            let (holder_kind, holder_id) = holder_parts(s.holder);
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\n",
                s.id,
                escape(&s.resource),
                s.count,
                holder_kind,
                holder_id,
                s.owner,
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_resource_stacks.sql"), &buf).await?;
    }

    // Activities
    {
        let mut buf = String::new();
        for a in world.activities.values() {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                a.id,
                a.citizen,
                escape(&json_str(&a.kind)),
                opt_u64(a.from_building),
                opt_u64(a.to_building),
                escape(&json_str(&a.path)),
                ts(a.start),
                ts(a.end),
                escape(&enum_str(&a.status)),
                opt_u64(a.contract),
                escape(&json_str(&a.carried)),
                escape(&json_str(&a.notes)),
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_activities.sql"), &buf).await?;
    }

    // Stratagems
    {
        let mut buf = String::new();
        for s in world.stratagems.values() {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                s.id,
                escape(&json_str(&s.kind)),
                s.executed_by,
                escape(&enum_str(&s.variant)),
                escape(&enum_str(&s.status)),
                ts(s.executed_at),
                ts(s.expires_at),
                s.daily_cost,
                escape(&json_str(&s.progress)),
                escape(&json_str(&s.notes)),
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_stratagems.sql"), &buf).await?;
    }

    Ok(())
}

/// Execute a COPY FROM STDIN with the given text-format payload.
async fn copy_in(pool: &PgPool, statement: &str, data: &str) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    let mut copy = conn.copy_in_raw(statement).await?;
    copy.send(data.as_bytes()).await?;
    copy.finish().await?;
    Ok(())
}

/// Escape a string for Postgres COPY text format.
/// Backslash must be escaped first, then the special whitespace characters.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Render an optional id as a COPY text value (`\N` for NULL).
fn opt_u64(v: Option<u64>) -> String {
    match v {
        Some(n) => n.to_string(),
        None => "\\N".to_string(),
    }
}

/// Render an optional string as a COPY text value (`\N` for NULL).
fn opt_str(v: Option<&str>) -> String {
    match v {
        Some(s) => escape(s),
        None => "\\N".to_string(),
    }
}

/// Timestamps are archived as their packed integer form; `SimTimestamp::from_raw`
/// restores them.
fn ts(t: SimTimestamp) -> u32 {
    t.as_u32()
}

fn holder_parts(holder: Holder) -> (&'static str, u64) {
    match holder {
        Holder::Building(id) => ("building", id),
        Holder::Citizen(id) => ("citizen", id),
    }
}

/// Serialize a serde enum variant to its snake_case string (strips JSON quotes).
fn enum_str<T: Serialize>(val: &T) -> String {
    let json = serde_json::to_string(val).expect("enum serialization");
    // serde_json wraps string enums in quotes: "\"value\""
    json[1..json.len() - 1].to_string()
}

/// Serialize a structured field to a JSON document for a jsonb column.
fn json_str<T: Serialize>(val: &T) -> String {
    serde_json::to_string(val).expect("json serialization")
}
