use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

const HEADER: [&str; 10] = [
    "Docket No",
    "Route ID",
    "Route Name",
    "Fault Date/Time",
    "Handover Date/Time",
    "Clearance Date/Time",
    "Fault Duration",
    "Status",
    "Initial Assessment",
    "Services Down",
];

const ROUTES: [(&str, &str); 6] = [
    ("R-101", "North Ring"),
    ("R-102", "South Spur"),
    ("R-205", "Harbour Link"),
    ("R-207", "Airport Loop"),
    ("R-311", "Valley Backbone"),
    ("R-318", "Coastal Express"),
];

const ASSESSMENTS: [&str; 5] = [
    "Fibre cut",
    "Power failure at node",
    "Card fault",
    "Civil works damage",
    "Under investigation",
];

const SERVICES: [&str; 4] = ["Voice", "Broadband", "Leased line", "Mobile backhaul"];

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n.max(1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }
}

fn fault_row(rng: &mut SimpleRng, docket: usize, start: NaiveDateTime) -> Value {
    let (route_id, route_name) = *rng.pick(&ROUTES);
    let fault = start
        + Duration::hours(rng.below(24 * 14) as i64)
        + Duration::minutes(rng.below(60) as i64);
    let handover = fault + Duration::minutes(10 + rng.below(50) as i64);
    let restored = rng.below(4) != 0;

    let (clearance, duration, status) = if restored {
        let clearance = handover + Duration::minutes(30 + rng.below(600) as i64);
        let mins = (clearance - fault).num_minutes();
        (
            json!(clearance.format(TIME_FORMAT).to_string()),
            json!(format!("{}h {:02}m", mins / 60, mins % 60)),
            "Restored",
        )
    } else {
        (Value::Null, Value::Null, "Carried Forward")
    };

    let mut services: Vec<&str> = SERVICES
        .iter()
        .copied()
        .filter(|_| rng.below(2) == 0)
        .collect();
    if services.is_empty() {
        services.push(SERVICES[0]);
    }

    json!([
        format!("D-{:04}", 1000 + docket),
        route_id,
        route_name,
        fault.format(TIME_FORMAT).to_string(),
        handover.format(TIME_FORMAT).to_string(),
        clearance,
        duration,
        status,
        rng.pick(&ASSESSMENTS),
        services.join(", "),
    ])
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;

    let n_faults = 120;
    let mut rows = Vec::with_capacity(n_faults + 1);
    rows.push(json!(HEADER));
    for docket in 0..n_faults {
        rows.push(fault_row(&mut rng, docket, start));
    }

    let output_path = "sample_faults.json";
    let body = serde_json::to_string_pretty(&rows).context("serializing sample sheet")?;
    std::fs::write(output_path, body).with_context(|| format!("writing {output_path}"))?;

    println!("Wrote {n_faults} fault records to {output_path}");
    println!("Point \"endpoint\" in fault-viewer.json at it to browse offline.");
    Ok(())
}
