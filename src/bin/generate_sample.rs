use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

const AGENCIES: &[(&str, &[&str])] = &[
    ("NIH", &["NCI", "NHLBI", "NIA", "NICHD"]),
    ("DoD", &["CDMRP", "DARPA"]),
    ("NSF", &["BIO", "ENG"]),
];
const OBJECTIVES: &[&str] = &["Diagnosis", "Treatment", "Prevention", "Survivorship"];
const INTERVENTIONS: &[&str] = &["Drug", "Device", "Behavioral", "Biologic", "Procedure"];
const READINESS: &[&str] = &[
    "Basic",
    "Preclinical",
    "Clinical (Phase I, II, FS)",
    "Clinical (Phase III)",
];
const STATES: &[&str] = &["MD", "CA", "MA", "TX", "NY", "Québec"];
const TOPICS: &[&str] = &["pediatric cancer", "heart failure", "dementia", "sepsis", "asthma"];
const MECHANISMS: &[&str] = &["R01", "R21", "U01", "P30"];

/// One to three distinct values joined the way the sheet does it:
/// commas, semicolons, or a JSON array literal.
fn multi_value(rng: &mut SimpleRng, items: &[&str]) -> String {
    let n = 1 + rng.below(3);
    let mut chosen: Vec<&str> = Vec::new();
    while chosen.len() < n.min(items.len()) {
        let item = rng.pick(items);
        if !chosen.contains(&item) {
            chosen.push(item);
        }
    }
    match rng.below(3) {
        0 => chosen.join(", "),
        1 => chosen.join("; "),
        _ => serde_json::to_string(&chosen).unwrap_or_default(),
    }
}

fn amount_text(rng: &mut SimpleRng) -> String {
    let dollars = 25_000 + rng.below(5_000_000);
    match rng.below(10) {
        0 => "TBD".to_string(),
        1 => dollars.to_string(),
        _ => {
            let digits = dollars.to_string();
            let mut grouped = String::new();
            for (i, ch) in digits.chars().enumerate() {
                if i > 0 && (digits.len() - i) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(ch);
            }
            format!("${grouped}")
        }
    }
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_grants.parquet".to_string());
    let mut rng = SimpleRng::new(42);

    // Header spellings as they come out of the workbook, stray spaces included.
    let headers = [
        "Project Number",
        " Project  Title",
        "Project Abstract",
        "Fiscal Year ",
        "Agency",
        "Agency  IC",
        "Objective - General",
        "Objective - Specific",
        "Intervention",
        "Readiness",
        "PI",
        "Organization",
        "State",
        "Mechanism",
        "Amount",
    ];
    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    let n_rows = 120;
    for row in 0..n_rows {
        let (agency, ics) = AGENCIES[rng.below(AGENCIES.len())];
        let topic = rng.pick(TOPICS);
        let year = 2005 + rng.below(21);
        let values = [
            Some(format!("{}-{:05}", rng.pick(MECHANISMS), row)),
            Some(format!("A study of {topic}")),
            Some(format!(
                "We evaluate new approaches to {topic} care across {} sites.",
                1 + rng.below(12)
            )),
            Some(if row % 17 == 0 { format!("FY{year}") } else { year.to_string() }),
            Some(agency.to_string()),
            Some(multi_value(&mut rng, ics)),
            Some(multi_value(&mut rng, OBJECTIVES)),
            Some(multi_value(&mut rng, OBJECTIVES)),
            Some(multi_value(&mut rng, INTERVENTIONS)),
            Some(rng.pick(READINESS).to_string()),
            if row % 11 == 0 { None } else { Some(format!("Investigator {row}")) },
            Some(format!("{} Research Institute", rng.pick(STATES))),
            Some(rng.pick(STATES).to_string()),
            Some(rng.pick(MECHANISMS).to_string()),
            Some(amount_text(&mut rng)),
        ];
        for (column, value) in columns.iter_mut().zip(values) {
            column.push(value);
        }
    }

    let schema = Arc::new(Schema::new(
        headers
            .iter()
            .map(|h| Field::new(*h, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = columns
        .into_iter()
        .map(|values| Arc::new(StringArray::from(values)) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    // Write Parquet
    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    println!("Wrote {n_rows} grants to {output_path}");
    Ok(())
}
