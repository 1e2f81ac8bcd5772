//! Option exercise schedules.

use qf_time::Date;
use std::fmt;

/// Type of exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseType {
    /// Exercisable only at expiry.
    European,
    /// Exercisable at any time up to expiry.
    American,
    /// Exercisable on a fixed set of dates.
    Bermudan,
}

/// When an option may be exercised.
#[derive(Debug, Clone)]
pub struct Exercise {
    exercise_type: ExerciseType,
    dates: Vec<Date>,
}

impl Exercise {
    /// A European exercise at `expiry`.
    pub fn european(expiry: Date) -> Self {
        Self {
            exercise_type: ExerciseType::European,
            dates: vec![expiry],
        }
    }

    /// An American exercise from `earliest` to `latest`.
    pub fn american(earliest: Date, latest: Date) -> Self {
        Self {
            exercise_type: ExerciseType::American,
            dates: vec![earliest, latest],
        }
    }

    /// A Bermudan exercise on the given dates (sorted, deduplicated).
    pub fn bermudan(mut dates: Vec<Date>) -> Self {
        dates.sort();
        dates.dedup();
        Self {
            exercise_type: ExerciseType::Bermudan,
            dates,
        }
    }

    /// The exercise type.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }

    /// The last possible exercise date.
    pub fn last_date(&self) -> Date {
        *self.dates.last().expect("exercise holds at least one date")
    }

    /// All exercise dates.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exercise_type {
            ExerciseType::European => write!(f, "European({})", self.dates[0]),
            ExerciseType::American => {
                write!(f, "American({} to {})", self.dates[0], self.last_date())
            }
            ExerciseType::Bermudan => write!(f, "Bermudan({} dates)", self.dates.len()),
        }
    }
}
