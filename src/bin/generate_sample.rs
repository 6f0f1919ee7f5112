use std::path::PathBuf;

use rust_xlsxwriter::Workbook;

use automation_dashboard::config::default_countries;
use automation_dashboard::data::years::{BASE_YEAR, YEAR_COUNT};
use automation_dashboard::export::EXCEL_SHEET;

/// (SOC code, title, theoretical automation probability, adoption midpoint offset)
const OCCUPATIONS: &[(&str, &str, f64, f64)] = &[
    ("11-1011", "Chief Executives", 0.015, 40.0),
    ("13-2011", "Accountants and Auditors", 0.94, 18.0),
    ("15-1252", "Software Developers", 0.042, 30.0),
    ("25-2021", "Elementary School Teachers", 0.0044, 45.0),
    ("29-1141", "Registered Nurses", 0.009, 42.0),
    ("35-2014", "Cooks, Restaurant", 0.96, 22.0),
    ("41-2011", "Cashiers", 0.97, 12.0),
    ("43-3071", "Tellers", 0.98, 10.0),
    ("43-9021", "Data Entry Keyers", 0.99, 8.0),
    ("47-2031", "Carpenters", 0.72, 35.0),
    ("51-2092", "Team Assemblers", 0.97, 15.0),
    ("53-3032", "Heavy and Tractor-Trailer Truck Drivers", 0.79, 25.0),
];

/// Technology diffusion speed per country code; 1.0 is the US pace.
fn diffusion_factor(code: &str) -> f64 {
    match code {
        "USA" => 1.0,
        "Germany" => 0.9,
        "China" => 0.85,
        "Algeria" => 0.45,
        "MENA" => 0.5,
        "Mali" => 0.25,
        _ => 0.6,
    }
}

/// Logistic adoption curve scaled to the theoretical probability.
fn diffused_probability(theoretical: f64, midpoint: f64, factor: f64, t: f64) -> f64 {
    let steepness = 0.15 * factor;
    let shifted = midpoint / factor.max(0.1);
    theoretical / (1.0 + (-steepness * (t - shifted)).exp())
}

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

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform noise in `[-amplitude, amplitude)`.
    fn jitter(&mut self, amplitude: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * amplitude
    }
}

fn main() {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");

    let mut rng = SimpleRng::new(42);

    for country in default_countries() {
        let factor = diffusion_factor(&country.code);

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(EXCEL_SHEET).expect("Invalid sheet name");

        sheet.write_string(0, 0, "SOC Code").expect("write header");
        sheet.write_string(0, 1, "Occupation").expect("write header");
        for i in 0..YEAR_COUNT {
            sheet
                .write_number(0, (i + 2) as u16, (BASE_YEAR + i as i32) as f64)
                .expect("write header");
        }

        for (r, &(soc, title, theoretical, midpoint)) in OCCUPATIONS.iter().enumerate() {
            let row = r as u32 + 1;
            sheet.write_string(row, 0, soc).expect("write SOC code");
            sheet.write_string(row, 1, title).expect("write title");

            let mut previous = 0.0_f64;
            for i in 0..YEAR_COUNT {
                let p = diffused_probability(theoretical, midpoint, factor, i as f64)
                    + rng.jitter(0.002);
                // Adoption never goes backwards.
                let p = p.clamp(0.0, 1.0).max(previous);
                previous = p;
                sheet
                    .write_number(row, (i + 2) as u16, (p * 10_000.0).round() / 10_000.0)
                    .expect("write probability");
            }
        }

        let path = out_dir.join(&country.file);
        workbook.save(&path).expect("Failed to write workbook");
        println!(
            "Wrote {} occupations ({} years each) to {}",
            OCCUPATIONS.len(),
            YEAR_COUNT,
            path.display()
        );
    }
}
