//! Raw score to band conversion.
//!
//! Each module has a fixed step table mapping the number of correct answers
//! (out of 40) to a band between 0.0 and 9.0 in half-band steps.

use crate::model::TestModule;

/// One step of a conversion table: `min_correct` or more earns `band`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStep {
    pub min_correct: u32,
    pub band: f64,
}

const fn step(min_correct: u32, band: f64) -> BandStep {
    BandStep { min_correct, band }
}

/// Highest raw score any table is defined for.
pub const MAX_RAW_SCORE: u32 = 40;

static ACADEMIC_READING: [BandStep; 17] = [
    step(0, 0.0),
    step(1, 1.0),
    step(2, 2.0),
    step(4, 2.5),
    step(6, 3.0),
    step(8, 3.5),
    step(10, 4.0),
    step(13, 4.5),
    step(15, 5.0),
    step(19, 5.5),
    step(23, 6.0),
    step(27, 6.5),
    step(30, 7.0),
    step(33, 7.5),
    step(35, 8.0),
    step(37, 8.5),
    step(39, 9.0),
];

static GENERAL_READING: [BandStep; 18] = [
    step(0, 0.0),
    step(1, 1.0),
    step(2, 1.5),
    step(4, 2.0),
    step(6, 2.5),
    step(9, 3.0),
    step(12, 3.5),
    step(15, 4.0),
    step(19, 4.5),
    step(23, 5.0),
    step(27, 5.5),
    step(30, 6.0),
    step(32, 6.5),
    step(34, 7.0),
    step(36, 7.5),
    step(37, 8.0),
    step(39, 8.5),
    step(40, 9.0),
];

static LISTENING: [BandStep; 17] = [
    step(0, 0.0),
    step(1, 1.0),
    step(2, 2.0),
    step(4, 2.5),
    step(6, 3.0),
    step(8, 3.5),
    step(10, 4.0),
    step(13, 4.5),
    step(16, 5.0),
    step(18, 5.5),
    step(23, 6.0),
    step(26, 6.5),
    step(30, 7.0),
    step(32, 7.5),
    step(35, 8.0),
    step(37, 8.5),
    step(39, 9.0),
];

/// The conversion table for a module, ordered by `min_correct`.
pub fn band_table(module: TestModule) -> &'static [BandStep] {
    match module {
        TestModule::AcademicReading => &ACADEMIC_READING,
        TestModule::GeneralReading => &GENERAL_READING,
        TestModule::Listening => &LISTENING,
    }
}

/// Convert a raw correct count to a band. Counts above 40 clamp to the top band.
pub fn band_for(module: TestModule, correct: u32) -> f64 {
    let correct = correct.min(MAX_RAW_SCORE);
    band_table(module)
        .iter()
        .take_while(|s| s.min_correct <= correct)
        .last()
        .map(|s| s.band)
        .unwrap_or(0.0)
}
