//! Numeric Question Synthesizer
//!
//! Parametric word problems: sample integer parameters, compute the exact
//! answer, derive three distractors from fixed offsets. The correct answer is
//! always option 0 for the numeric families.
//!
//! Randomness is passed in, never pulled from a global, so a seeded
//! `StdRng` reproduces a question exactly.

use crate::types::{question_id, Difficulty, Question, DEFAULT_QUESTION_TYPE};
use rand::Rng;

/// Topic families the synthesizer can generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    LinearEquations,
    QuadraticEquations,
    Kinematics,
    Forces,
    /// Fixed pool of cell-biology facts (not numeric)
    CellBiology,
}

impl Family {
    pub const ALL: [Family; 5] = [
        Family::LinearEquations,
        Family::QuadraticEquations,
        Family::Kinematics,
        Family::Forces,
        Family::CellBiology,
    ];

    /// Topic label stamped on synthesized questions
    pub fn topic(&self) -> &'static str {
        match self {
            Family::LinearEquations => "Linear Equations",
            Family::QuadraticEquations => "Quadratic Equations",
            Family::Kinematics => "Kinematics",
            Family::Forces => "Forces",
            Family::CellBiology => "Cell Biology",
        }
    }

    /// Recognize a topic name (case-insensitive)
    pub fn for_topic(topic: &str) -> Option<Family> {
        let topic = topic.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.topic().eq_ignore_ascii_case(topic))
    }

    /// Numeric family matching a bank concept, used for parametric variations
    pub fn for_concept(concept: &str) -> Option<Family> {
        match concept {
            "Linear Equations" => Some(Family::LinearEquations),
            "Quadratic Formula and Discriminant" => Some(Family::QuadraticEquations),
            "Speed and Velocity" => Some(Family::Kinematics),
            "Newton's Second Law" => Some(Family::Forces),
            _ => None,
        }
    }

    /// True for the arithmetic families (everything but the fact pool)
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Family::CellBiology)
    }
}

/// Generate one question for `family`
pub fn synthesize<R: Rng + ?Sized>(family: Family, difficulty: Difficulty, rng: &mut R) -> Question {
    match family {
        Family::LinearEquations => linear_question(LinearParams::sample(rng), difficulty),
        Family::QuadraticEquations => quadratic_question(QuadraticParams::sample(rng), difficulty),
        Family::Kinematics => kinematics_question(KinematicsParams::sample(rng), difficulty),
        Family::Forces => forces_question(ForcesParams::sample(rng), difficulty),
        Family::CellBiology => {
            cell_biology_question(rng.gen_range(0..CELL_BIOLOGY_FACTS.len()), difficulty)
        }
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

/// `a·x + b = c`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearParams {
    pub a: i64,
    pub b: i64,
    pub x: i64,
}

impl LinearParams {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            a: rng.gen_range(2..=6),
            b: rng.gen_range(1..=10),
            x: rng.gen_range(1..=10),
        }
    }

    pub fn c(&self) -> i64 {
        self.a * self.x + self.b
    }
}

/// `a·x² + b·x + c = 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadraticParams {
    pub a: i64,
    pub b: i64,
    pub c: i64,
}

impl QuadraticParams {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            a: rng.gen_range(1..=3),
            b: rng.gen_range(2..=7),
            c: rng.gen_range(1..=5),
        }
    }

    pub fn discriminant(&self) -> i64 {
        self.b * self.b - 4 * self.a * self.c
    }
}

/// Distance in km over time in hours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KinematicsParams {
    pub distance: i64,
    /// Never zero: sampling starts at 2
    pub time: i64,
}

impl KinematicsParams {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            distance: rng.gen_range(50..=149),
            time: rng.gen_range(2..=6),
        }
    }

    pub fn speed(&self) -> f64 {
        self.distance as f64 / self.time as f64
    }
}

/// Mass in kg and acceleration in m/s²
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcesParams {
    pub mass: i64,
    pub acceleration: i64,
}

impl ForcesParams {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            mass: rng.gen_range(5..=14),
            acceleration: rng.gen_range(2..=6),
        }
    }

    pub fn force(&self) -> i64 {
        self.mass * self.acceleration
    }
}

// ============================================================================
// RENDERING
// ============================================================================

pub fn linear_question(p: LinearParams, difficulty: Difficulty) -> Question {
    let c = p.c();
    let x = p.x as f64;
    numeric_question(
        Family::LinearEquations,
        difficulty,
        format!("Solve for x: {}x + {} = {}", p.a, p.b, c),
        numeric_options(x, [x + 1.0, x - 1.0, x + 2.0], |v| format!("x = {}", format_number(v))),
        format!(
            "Subtract {} from both sides: {}x = {}, then divide by {}: x = {}",
            p.b,
            p.a,
            c - p.b,
            p.a,
            p.x
        ),
    )
}

pub fn quadratic_question(p: QuadraticParams, difficulty: Difficulty) -> Question {
    let d = p.discriminant() as f64;
    numeric_question(
        Family::QuadraticEquations,
        difficulty,
        format!("What is the discriminant of {}x² + {}x + {} = 0?", p.a, p.b, p.c),
        numeric_options(d, [d + 4.0, d - 4.0, d + 8.0], format_number),
        format!(
            "Discriminant = b² - 4ac = {}² - 4({})({}) = {}",
            p.b,
            p.a,
            p.c,
            p.discriminant()
        ),
    )
}

pub fn kinematics_question(p: KinematicsParams, difficulty: Difficulty) -> Question {
    let speed = p.speed();
    numeric_question(
        Family::Kinematics,
        difficulty,
        format!(
            "A car travels {} km in {} hours. What is its average speed?",
            p.distance, p.time
        ),
        numeric_options(speed, [speed + 10.0, speed - 5.0, speed * 2.0], |v| {
            format!("{} km/h", format_number(v))
        }),
        format!(
            "Speed = Distance ÷ Time = {} km ÷ {} h = {} km/h",
            p.distance,
            p.time,
            format_number(speed)
        ),
    )
}

pub fn forces_question(p: ForcesParams, difficulty: Difficulty) -> Question {
    let f = p.force() as f64;
    numeric_question(
        Family::Forces,
        difficulty,
        format!(
            "What force is needed to accelerate a {} kg object at {} m/s²?",
            p.mass, p.acceleration
        ),
        numeric_options(f, [f + 5.0, f - 3.0, f * 2.0], |v| format!("{} N", format_number(v))),
        format!(
            "Force = mass × acceleration = {} kg × {} m/s² = {} N",
            p.mass,
            p.acceleration,
            p.force()
        ),
    )
}

struct Fact {
    question: &'static str,
    options: [&'static str; 4],
    correct: usize,
    explanation: &'static str,
}

const CELL_BIOLOGY_FACTS: [Fact; 2] = [
    Fact {
        question: "Which organelle is responsible for protein synthesis?",
        options: ["Nucleus", "Mitochondria", "Ribosome", "Golgi apparatus"],
        correct: 2,
        explanation: "Ribosomes are the cellular structures responsible for protein synthesis",
    },
    Fact {
        question: "What is the function of the cell membrane?",
        options: [
            "Energy production",
            "Protein synthesis",
            "Controls what enters/exits cell",
            "Stores DNA",
        ],
        correct: 2,
        explanation: "The cell membrane controls what substances can enter and exit the cell",
    },
];

/// Fact `index` from the cell-biology pool (wraps around)
pub fn cell_biology_question(index: usize, difficulty: Difficulty) -> Question {
    let fact = &CELL_BIOLOGY_FACTS[index % CELL_BIOLOGY_FACTS.len()];
    Question {
        id: question_id("gen"),
        text: fact.question.to_string(),
        options: fact.options.iter().map(|s| s.to_string()).collect(),
        correct_answer_index: fact.correct,
        explanation: fact.explanation.to_string(),
        topic: Family::CellBiology.topic().to_string(),
        difficulty,
        question_type: DEFAULT_QUESTION_TYPE.to_string(),
        concept: Some(Family::CellBiology.topic().to_string()),
        improvement_areas: Vec::new(),
        encouragement: None,
        related_topics: Vec::new(),
    }
}

fn numeric_question(
    family: Family,
    difficulty: Difficulty,
    text: String,
    options: Vec<String>,
    explanation: String,
) -> Question {
    Question {
        id: question_id("gen"),
        text,
        options,
        correct_answer_index: 0,
        explanation,
        topic: family.topic().to_string(),
        difficulty,
        question_type: DEFAULT_QUESTION_TYPE.to_string(),
        concept: Some(family.topic().to_string()),
        improvement_areas: Vec::new(),
        encouragement: None,
        related_topics: Vec::new(),
    }
}

/// Correct value first, then the offset distractors.
///
/// A distractor that renders the same as an earlier option is replaced by
/// the next free value above the correct answer (`correct + 3`, `+ 4`, ...).
fn numeric_options(correct: f64, distractors: [f64; 3], render: impl Fn(f64) -> String) -> Vec<String> {
    let mut options = vec![render(correct)];
    let mut bump = 3.0;
    for value in distractors {
        let mut text = render(value);
        while options.contains(&text) {
            text = render(correct + bump);
            bump += 1.0;
        }
        options.push(text);
    }
    options
}

/// Integers print bare, everything else with at most two decimals
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.2}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
