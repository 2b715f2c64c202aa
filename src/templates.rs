//! Template Bank: hand-authored questions keyed by subject, topic and difficulty
//!
//! The bank is static content. Lookups never fail in the error sense: a miss
//! is an explicit [`Lookup`] variant that the quiz assembler turns into
//! fallback questions.

use crate::types::{question_id, Difficulty, Question};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A stored question with its teaching metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTemplate {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
    /// Fine-grained concept name, e.g. "Linear Equations"
    pub concept: String,
    pub improvement_areas: Vec<String>,
    pub encouragement: String,
    pub related_topics: Vec<String>,
}

impl QuestionTemplate {
    /// Materialize a fresh question; option and metadata lists are copied
    pub fn materialize(
        &self,
        id_prefix: &str,
        topic: &str,
        difficulty: Difficulty,
        question_type: &str,
    ) -> Question {
        Question {
            id: question_id(id_prefix),
            text: self.question.clone(),
            options: self.options.clone(),
            correct_answer_index: self.correct_answer,
            explanation: self.explanation.clone(),
            topic: topic.to_string(),
            difficulty,
            question_type: question_type.to_string(),
            concept: Some(self.concept.clone()),
            improvement_areas: self.improvement_areas.clone(),
            encouragement: Some(self.encouragement.clone()),
            related_topics: self.related_topics.clone(),
        }
    }
}

/// Result of a bank lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Hit(&'a [QuestionTemplate]),
    UnknownSubject,
    UnknownTopic,
    /// Subject and topic exist but this difficulty has no templates
    EmptyDifficulty,
}

impl<'a> Lookup<'a> {
    pub fn templates(&self) -> Option<&'a [QuestionTemplate]> {
        match *self {
            Lookup::Hit(templates) => Some(templates),
            _ => None,
        }
    }
}

type TopicTable = BTreeMap<String, HashMap<Difficulty, Vec<QuestionTemplate>>>;

/// Read-only mapping subject -> topic -> difficulty -> templates
#[derive(Debug, Clone, Default)]
pub struct TemplateBank {
    subjects: BTreeMap<String, TopicTable>,
}

static BUILTIN: Lazy<TemplateBank> = Lazy::new(|| {
    let mut bank = TemplateBank::new();
    mathematics(&mut bank);
    physics(&mut bank);
    chemistry(&mut bank);
    biology(&mut bank);
    computer_science(&mut bank);
    bank
});

impl TemplateBank {
    /// An empty bank; every lookup misses
    pub fn new() -> Self {
        Self::default()
    }

    /// The shipped question bank, built once and shared
    pub fn builtin() -> &'static TemplateBank {
        &BUILTIN
    }

    /// Append templates to a bucket, creating subject and topic as needed
    pub fn insert(
        &mut self,
        subject: &str,
        topic: &str,
        difficulty: Difficulty,
        templates: Vec<QuestionTemplate>,
    ) {
        self.subjects
            .entry(subject.to_string())
            .or_default()
            .entry(topic.to_string())
            .or_default()
            .entry(difficulty)
            .or_default()
            .extend(templates);
    }

    pub fn lookup(&self, subject: &str, topic: &str, difficulty: Difficulty) -> Lookup<'_> {
        let Some(topics) = self.subjects.get(subject) else {
            return Lookup::UnknownSubject;
        };
        let Some(levels) = topics.get(topic) else {
            return Lookup::UnknownTopic;
        };
        match levels.get(&difficulty) {
            Some(templates) if !templates.is_empty() => Lookup::Hit(templates),
            _ => Lookup::EmptyDifficulty,
        }
    }

    pub fn subjects(&self) -> Vec<&str> {
        self.subjects.keys().map(|s| s.as_str()).collect()
    }

    pub fn topics(&self, subject: &str) -> Vec<&str> {
        self.subjects
            .get(subject)
            .map(|topics| topics.keys().map(|t| t.as_str()).collect())
            .unwrap_or_default()
    }

    /// Number of templates stored for a bucket (0 on a miss)
    pub fn count(&self, subject: &str, topic: &str, difficulty: Difficulty) -> usize {
        self.lookup(subject, topic, difficulty)
            .templates()
            .map_or(0, |t| t.len())
    }
}

/// Compact constructor for the static content below
#[allow(clippy::too_many_arguments)]
pub(crate) fn template(
    question: &str,
    options: [&str; 4],
    correct_answer: usize,
    explanation: &str,
    concept: &str,
    improvement_areas: [&str; 3],
    encouragement: &str,
    related_topics: [&str; 3],
) -> QuestionTemplate {
    QuestionTemplate {
        question: question.to_string(),
        options: options.iter().map(|s| s.to_string()).collect(),
        correct_answer,
        explanation: explanation.to_string(),
        concept: concept.to_string(),
        improvement_areas: improvement_areas.iter().map(|s| s.to_string()).collect(),
        encouragement: encouragement.to_string(),
        related_topics: related_topics.iter().map(|s| s.to_string()).collect(),
    }
}

// ============================================================================
// BANK CONTENT
// ============================================================================

fn mathematics(bank: &mut TemplateBank) {
    use Difficulty::*;
    const S: &str = "Mathematics";

    bank.insert(S, "Algebra", Beginner, vec![
        template(
            "Solve for x: 3x + 7 = 22",
            ["x = 5", "x = 7", "x = 15", "x = 29"],
            0,
            "To solve 3x + 7 = 22: First, subtract 7 from both sides: 3x = 15. Then divide both \
             sides by 3: x = 5. Always isolate the variable by performing inverse operations.",
            "Linear Equations",
            ["Practice isolating variables", "Review inverse operations", "Work on equation solving steps"],
            "Great effort! Linear equations are the foundation of algebra. Keep practicing and \
             you'll master this concept!",
            ["Variables", "Inverse Operations", "Equation Solving"],
        ),
        template(
            "What is the coefficient of x in the expression 5x + 3?",
            ["3", "5", "8", "x"],
            1,
            "The coefficient is the number that multiplies the variable. In 5x + 3, the number 5 \
             is multiplying x, so 5 is the coefficient of x.",
            "Coefficients and Terms",
            ["Identify coefficients in expressions", "Understand algebraic terms", "Practice with variables"],
            "You're building strong algebra foundations! Understanding coefficients is key to \
             success in algebra. Keep it up!",
            ["Variables", "Algebraic Expressions", "Terms"],
        ),
        template(
            "Simplify: 4x + 2x - x",
            ["5x", "6x", "7x", "4x"],
            0,
            "Combine like terms: 4x + 2x - x = (4 + 2 - 1)x = 5x. When combining like terms, add \
             or subtract the coefficients and keep the variable part the same.",
            "Combining Like Terms",
            ["Practice combining like terms", "Review addition and subtraction of coefficients", "Work with algebraic expressions"],
            "Excellent work! Combining like terms is a crucial skill that you'll use throughout \
             algebra. You're doing great!",
            ["Like Terms", "Algebraic Expressions", "Simplification"],
        ),
    ]);

    bank.insert(S, "Algebra", Intermediate, vec![
        template(
            "Factor completely: x² + 8x + 15",
            ["(x + 3)(x + 5)", "(x + 1)(x + 15)", "(x - 3)(x - 5)", "(x + 2)(x + 7)"],
            0,
            "To factor x² + 8x + 15, find two numbers that multiply to 15 and add to 8. Those \
             numbers are 3 and 5. So x² + 8x + 15 = (x + 3)(x + 5). Check: (x + 3)(x + 5) = \
             x² + 5x + 3x + 15 = x² + 8x + 15",
            "Factoring Quadratics",
            ["Practice finding factor pairs", "Review FOIL method for checking", "Work on quadratic factoring patterns"],
            "Factoring can be tricky, but you're tackling it head-on! This skill opens doors to \
             solving quadratic equations. Keep practicing!",
            ["Quadratic Expressions", "FOIL Method", "Factor Pairs"],
        ),
        template(
            "Solve the system: 2x + y = 7 and x - y = 2",
            ["x = 3, y = 1", "x = 2, y = 3", "x = 1, y = 5", "x = 4, y = -1"],
            0,
            "Using elimination method: Add the equations: (2x + y) + (x - y) = 7 + 2, which gives \
             3x = 9, so x = 3. Substitute back: 2(3) + y = 7, so 6 + y = 7, therefore y = 1. \
             Check: 2(3) + 1 = 7 and 3 - 1 = 2",
            "Systems of Linear Equations",
            ["Practice elimination method", "Review substitution method", "Work on checking solutions"],
            "Systems of equations are powerful tools for solving real-world problems! You're \
             developing advanced problem-solving skills. Amazing progress!",
            ["Elimination Method", "Substitution Method", "Linear Equations"],
        ),
    ]);

    bank.insert(S, "Algebra", Advanced, vec![template(
        "Find the discriminant of 2x² - 5x + 3 = 0 and determine the nature of roots",
        [
            "Discriminant = 1, two real roots",
            "Discriminant = -1, no real roots",
            "Discriminant = 25, two real roots",
            "Discriminant = 49, two real roots",
        ],
        0,
        "For ax² + bx + c = 0, discriminant = b² - 4ac. Here: a = 2, b = -5, c = 3. \
         Discriminant = (-5)² - 4(2)(3) = 25 - 24 = 1. Since discriminant > 0, there are two \
         distinct real roots.",
        "Quadratic Formula and Discriminant",
        ["Practice discriminant calculations", "Review quadratic formula components", "Study nature of roots"],
        "The discriminant is a powerful tool for analyzing quadratics! You're mastering advanced \
         algebraic concepts. Fantastic work!",
        ["Quadratic Formula", "Nature of Roots", "Quadratic Equations"],
    )]);

    bank.insert(S, "Geometry", Beginner, vec![
        template(
            "What is the area of a rectangle with length 12 cm and width 8 cm?",
            ["96 cm²", "40 cm²", "20 cm²", "48 cm²"],
            0,
            "Area of rectangle = length × width = 12 cm × 8 cm = 96 cm². Remember to include the \
             square units (cm²) in your answer since area is measured in square units.",
            "Area of Rectangles",
            ["Practice area formulas", "Review units for area measurements", "Work with rectangle properties"],
            "Area calculations are fundamental in geometry! You're building essential skills for \
             more complex shapes. Keep going!",
            ["Area Formulas", "Rectangle Properties", "Units of Measurement"],
        ),
        template(
            "In a triangle, if two angles are 45° and 60°, what is the third angle?",
            ["75°", "85°", "90°", "105°"],
            0,
            "The sum of angles in any triangle is always 180°. So: Third angle = 180° - 45° - 60° \
             = 75°. This is a fundamental property of triangles that applies to all triangles.",
            "Triangle Angle Sum",
            ["Memorize triangle angle sum property", "Practice angle calculations", "Review triangle types"],
            "Understanding triangle properties is key to geometry success! You're grasping \
             important concepts. Well done!",
            ["Triangle Properties", "Angle Relationships", "Polygon Angles"],
        ),
    ]);

    bank.insert(S, "Geometry", Intermediate, vec![template(
        "Find the circumference of a circle with radius 7 cm (use π ≈ 3.14)",
        ["43.96 cm", "21.98 cm", "153.86 cm", "49 cm"],
        0,
        "Circumference = 2πr = 2 × 3.14 × 7 = 43.96 cm. The circumference is the distance around \
         the circle. Remember the formula C = 2πr or C = πd (where d is diameter).",
        "Circle Circumference",
        ["Memorize circle formulas", "Practice with π calculations", "Review relationship between radius and diameter"],
        "Circles are everywhere in real life! Mastering circle formulas will help you solve many \
         practical problems. Great job!",
        ["Circle Properties", "Pi (π)", "Radius and Diameter"],
    )]);

    bank.insert(S, "Geometry", Advanced, vec![template(
        "In a right triangle, if one leg is 9 and the hypotenuse is 15, find the other leg",
        ["12", "6", "18", "24"],
        0,
        "Using Pythagorean theorem: a² + b² = c². Here: 9² + b² = 15², so 81 + b² = 225, \
         therefore b² = 144, and b = 12. The Pythagorean theorem only works for right triangles.",
        "Pythagorean Theorem",
        ["Practice Pythagorean theorem", "Review right triangle properties", "Work on square root calculations"],
        "The Pythagorean theorem is one of the most famous mathematical relationships! You're \
         mastering classical geometry. Excellent!",
        ["Right Triangles", "Square Roots", "Triangle Properties"],
    )]);

    bank.insert(S, "Calculus", Beginner, vec![template(
        "What is the derivative of f(x) = 5x³?",
        ["15x²", "5x²", "15x³", "5x⁴"],
        0,
        "Using the power rule: d/dx(axⁿ) = n·ax^(n-1). For f(x) = 5x³: derivative = 3 × 5x^(3-1) \
         = 15x². The power rule is fundamental for finding derivatives of polynomial functions.",
        "Power Rule for Derivatives",
        ["Practice power rule", "Review derivative notation", "Work with polynomial functions"],
        "Derivatives are the foundation of calculus! You're learning one of mathematics' most \
         powerful tools. Keep exploring!",
        ["Derivatives", "Power Rule", "Polynomial Functions"],
    )]);

    bank.insert(S, "Calculus", Intermediate, vec![template(
        "Find the derivative of f(x) = 3x² + 2x - 7",
        ["6x + 2", "3x + 2", "6x² + 2x", "6x - 7"],
        0,
        "Take the derivative term by term: d/dx(3x²) = 6x, d/dx(2x) = 2, d/dx(-7) = 0. So f'(x) \
         = 6x + 2 + 0 = 6x + 2. Constants have zero derivative, and we can differentiate each \
         term separately.",
        "Derivative of Polynomials",
        ["Practice term-by-term differentiation", "Review constant rule", "Work with polynomial derivatives"],
        "You're mastering polynomial differentiation! This skill is essential for optimization \
         and rate problems. Fantastic progress!",
        ["Polynomial Derivatives", "Sum Rule", "Constant Rule"],
    )]);

    bank.insert(S, "Calculus", Advanced, vec![template(
        "What is ∫(4x³ - 6x + 2)dx?",
        ["x⁴ - 3x² + 2x + C", "12x² - 6 + C", "4x⁴ - 6x² + 2x + C", "x⁴ - 3x² + C"],
        0,
        "Integrate term by term: ∫4x³dx = x⁴, ∫(-6x)dx = -3x², ∫2dx = 2x. Don't forget the \
         constant of integration +C. So the answer is x⁴ - 3x² + 2x + C.",
        "Integration of Polynomials",
        ["Practice integration rules", "Remember constant of integration", "Review antiderivatives"],
        "Integration is the reverse of differentiation! You're mastering both sides of calculus. \
         This opens doors to area and volume calculations!",
        ["Antiderivatives", "Integration Rules", "Constant of Integration"],
    )]);
}

fn physics(bank: &mut TemplateBank) {
    use Difficulty::*;
    const S: &str = "Physics";

    bank.insert(S, "Mechanics", Beginner, vec![
        template(
            "A car travels 120 km in 2 hours. What is its average speed?",
            ["60 km/h", "240 km/h", "122 km/h", "118 km/h"],
            0,
            "Average speed = total distance ÷ total time = 120 km ÷ 2 hours = 60 km/h. Speed \
             tells us how fast something is moving and is always positive. Remember to include \
             units in your answer!",
            "Speed and Velocity",
            ["Practice speed calculations", "Review distance-time relationships", "Work with units"],
            "Understanding motion is fundamental to physics! You're grasping how we describe \
             movement in the world around us. Great start!",
            ["Distance", "Time", "Motion"],
        ),
        template(
            "What is the SI unit of force?",
            ["Newton (N)", "Joule (J)", "Watt (W)", "Pascal (Pa)"],
            0,
            "The Newton (N) is the SI unit of force, named after Sir Isaac Newton. One Newton is \
             the force needed to accelerate 1 kg of mass at 1 m/s². Understanding units is \
             crucial in physics!",
            "Units and Measurements",
            ["Memorize SI units", "Review fundamental quantities", "Practice unit conversions"],
            "Knowing the right units is like speaking the language of physics! You're building a \
             strong foundation. Keep learning!",
            ["SI Units", "Force", "Mass and Acceleration"],
        ),
    ]);

    bank.insert(S, "Mechanics", Intermediate, vec![template(
        "A ball is thrown upward with initial velocity 20 m/s. What is its velocity after 1 \
         second? (g = 10 m/s²)",
        ["10 m/s", "30 m/s", "20 m/s", "0 m/s"],
        0,
        "Using v = u + at, where u = 20 m/s (initial velocity), a = -10 m/s² (acceleration due to \
         gravity, negative because it opposes motion), t = 1 s. So v = 20 + (-10)(1) = 10 m/s \
         upward.",
        "Kinematics with Gravity",
        ["Practice kinematic equations", "Understand gravity's effect", "Work with vector directions"],
        "Projectile motion is everywhere - from sports to space missions! You're learning to \
         predict how objects move. Awesome!",
        ["Kinematic Equations", "Gravity", "Projectile Motion"],
    )]);

    bank.insert(S, "Mechanics", Advanced, vec![template(
        "A 5 kg object accelerates at 3 m/s². What net force acts on it?",
        ["15 N", "8 N", "2 N", "1.67 N"],
        0,
        "Using Newton's second law: F = ma = 5 kg × 3 m/s² = 15 N. This fundamental law relates \
         force, mass, and acceleration. The direction of force is the same as the direction of \
         acceleration.",
        "Newton's Second Law",
        ["Practice F = ma calculations", "Review Newton's laws", "Understand force-acceleration relationship"],
        "Newton's laws govern everything from walking to rocket launches! You're mastering the \
         fundamental principles of motion. Brilliant!",
        ["Newton's Laws", "Force", "Mass and Acceleration"],
    )]);

    bank.insert(S, "Thermodynamics", Beginner, vec![template(
        "What happens to the volume of a gas when temperature increases at constant pressure?",
        ["Volume increases", "Volume decreases", "Volume stays the same", "Volume becomes zero"],
        0,
        "According to Charles's Law, volume is directly proportional to temperature at constant \
         pressure (V ∝ T). As temperature increases, gas molecules move faster and need more \
         space, so volume increases.",
        "Charles's Law",
        ["Study gas laws", "Review temperature-volume relationships", "Practice with proportional reasoning"],
        "Gas laws help us understand everything from weather to engines! You're exploring how \
         matter behaves. Fantastic!",
        ["Gas Laws", "Temperature", "Pressure and Volume"],
    )]);
}

fn chemistry(bank: &mut TemplateBank) {
    use Difficulty::*;
    const S: &str = "Chemistry";

    bank.insert(S, "Atomic Structure", Beginner, vec![
        template(
            "How many protons does a carbon atom have?",
            ["6", "12", "14", "8"],
            0,
            "Carbon has atomic number 6, which means it has 6 protons. The atomic number defines \
             the element - all carbon atoms have exactly 6 protons.",
            "Atomic Number and Protons",
            ["Memorize common atomic numbers", "Review periodic table organization", "Study proton-electron relationships"],
            "Understanding atoms is like learning the alphabet of chemistry! You're discovering \
             the building blocks of everything around us. Amazing!",
            ["Periodic Table", "Atomic Number", "Elements"],
        ),
        template(
            "What is the charge of an electron?",
            ["-1", "+1", "0", "-2"],
            0,
            "Electrons have a charge of -1 (negative one elementary charge). This negative charge \
             balances the positive charge of protons in neutral atoms.",
            "Electron Properties",
            ["Review subatomic particle properties", "Study charge relationships", "Practice with ions and neutral atoms"],
            "Electrons are responsible for chemical bonding and electricity. You're learning \
             about the particles that make chemistry possible!",
            ["Subatomic Particles", "Electric Charge", "Atomic Structure"],
        ),
    ]);

    bank.insert(S, "Atomic Structure", Intermediate, vec![template(
        "How many electrons can the third electron shell (n=3) hold?",
        ["18", "8", "2", "32"],
        0,
        "The maximum number of electrons in shell n is 2n². For the third shell (n=3): 2(3)² = \
         2(9) = 18 electrons. This shell has s, p, and d subshells that can hold 2, 6, and 10 \
         electrons respectively.",
        "Electron Shell Capacity",
        ["Practice 2n² formula", "Review electron shell structure", "Study subshell organization"],
        "Electron shells are like apartments for electrons! Understanding their organization \
         helps predict chemical behavior. You're doing great!",
        ["Electron Configuration", "Subshells", "Quantum Numbers"],
    )]);

    bank.insert(S, "Chemical Bonding", Beginner, vec![template(
        "What type of bond forms between sodium (Na) and chlorine (Cl) in table salt?",
        ["Ionic bond", "Covalent bond", "Metallic bond", "Hydrogen bond"],
        0,
        "Sodium loses an electron to become Na⁺, and chlorine gains an electron to become Cl⁻. \
         The electrostatic attraction between these oppositely charged ions forms an ionic bond. \
         This happens between metals and nonmetals.",
        "Ionic Bonding",
        ["Study electron transfer", "Review metal vs nonmetal properties", "Practice identifying bond types"],
        "Chemical bonds hold our world together! From the salt on your food to the water you \
         drink - you're learning how atoms connect. Wonderful!",
        ["Electron Transfer", "Ions", "Metals and Nonmetals"],
    )]);
}

fn biology(bank: &mut TemplateBank) {
    use Difficulty::*;
    const S: &str = "Biology";

    bank.insert(S, "Cell Biology", Beginner, vec![
        template(
            "Which organelle is known as the 'powerhouse of the cell'?",
            ["Mitochondria", "Nucleus", "Ribosome", "Endoplasmic reticulum"],
            0,
            "Mitochondria are called the 'powerhouse' because they produce ATP (adenosine \
             triphosphate), the energy currency of cells. They convert glucose and oxygen into \
             usable energy through cellular respiration.",
            "Cellular Energy Production",
            ["Study organelle functions", "Review cellular respiration", "Learn about ATP"],
            "Cells are like tiny cities with specialized workers! Understanding how they work \
             helps us understand all of life.",
            ["Organelles", "Cellular Respiration", "ATP"],
        ),
        template(
            "What process do plants use to convert sunlight into chemical energy?",
            ["Photosynthesis", "Cellular respiration", "Fermentation", "Transpiration"],
            0,
            "Photosynthesis converts light energy into chemical energy (glucose) using carbon \
             dioxide and water. The equation is: 6CO₂ + 6H₂O + light energy → C₆H₁₂O₆ + 6O₂. \
             This process also produces the oxygen we breathe!",
            "Photosynthesis",
            ["Study photosynthesis equation", "Review light-dependent reactions", "Learn about chloroplasts"],
            "Photosynthesis is one of the most important processes on Earth! Plants feed the \
             world and give us oxygen.",
            ["Chloroplasts", "Light Energy", "Glucose Production"],
        ),
    ]);

    bank.insert(S, "Cell Biology", Intermediate, vec![template(
        "During which phase of mitosis do chromosomes align at the cell's equator?",
        ["Metaphase", "Prophase", "Anaphase", "Telophase"],
        0,
        "During metaphase, chromosomes line up at the cell's equator (metaphase plate). This \
         ensures each daughter cell gets exactly the same genetic material. Think 'M' for \
         metaphase and 'Middle' for the middle of the cell!",
        "Mitosis Phases",
        ["Memorize mitosis phases", "Study chromosome behavior", "Review cell division importance"],
        "Cell division is how you grew from a single cell to who you are today! Understanding \
         mitosis reveals how growth and healing work.",
        ["Cell Division", "Chromosomes", "Genetic Material"],
    )]);
}

fn computer_science(bank: &mut TemplateBank) {
    use Difficulty::*;
    const S: &str = "Computer Science";

    bank.insert(S, "Programming", Beginner, vec![
        template(
            "What does 'HTML' stand for?",
            [
                "HyperText Markup Language",
                "High Tech Modern Language",
                "Home Tool Markup Language",
                "Hyperlink Text Markup Language",
            ],
            0,
            "HTML stands for HyperText Markup Language. It's the standard language for creating \
             web pages. 'HyperText' refers to links between pages, and 'Markup' means it uses \
             tags to structure content.",
            "Web Technologies",
            ["Study HTML basics", "Learn about web development", "Practice with markup languages"],
            "HTML is the backbone of the internet! Every website you visit uses HTML. You're \
             learning the language of the web!",
            ["Web Development", "Markup Languages", "Internet Technologies"],
        ),
        template(
            "In programming, what is a 'variable'?",
            ["A container that stores data", "A type of loop", "A programming language", "An error in code"],
            0,
            "A variable is like a labeled box that stores data in computer memory. You can put \
             different values in it and change them as needed. Variables are fundamental to all \
             programming languages!",
            "Programming Fundamentals",
            ["Practice declaring variables", "Study data types", "Learn variable naming conventions"],
            "Variables are like the building blocks of programming! Once you master them, you \
             can create amazing programs.",
            ["Data Types", "Memory", "Programming Concepts"],
        ),
    ]);

    bank.insert(S, "Programming", Intermediate, vec![template(
        "What is the time complexity of binary search?",
        ["O(log n)", "O(n)", "O(n²)", "O(1)"],
        0,
        "Binary search has O(log n) time complexity because it eliminates half of the remaining \
         elements in each step. With each comparison, the search space is cut in half, making it \
         very efficient for large datasets.",
        "Algorithm Complexity",
        ["Study Big O notation", "Practice algorithm analysis", "Review search algorithms"],
        "Understanding algorithm efficiency is crucial for writing fast programs! You're \
         thinking like a computer scientist. Excellent!",
        ["Big O Notation", "Search Algorithms", "Algorithm Analysis"],
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OPTION_COUNT;

    #[test]
    fn test_builtin_subjects() {
        let bank = TemplateBank::builtin();
        assert_eq!(
            bank.subjects(),
            vec!["Biology", "Chemistry", "Computer Science", "Mathematics", "Physics"]
        );
        assert_eq!(bank.topics("Mathematics"), vec!["Algebra", "Calculus", "Geometry"]);
        assert!(bank.topics("Astrology").is_empty());
    }

    #[test]
    fn test_bucket_sizes() {
        let bank = TemplateBank::builtin();
        assert_eq!(bank.count("Mathematics", "Algebra", Difficulty::Beginner), 3);
        assert_eq!(bank.count("Mathematics", "Algebra", Difficulty::Intermediate), 2);
        assert_eq!(bank.count("Mathematics", "Algebra", Difficulty::Advanced), 1);
        assert_eq!(bank.count("Physics", "Mechanics", Difficulty::Beginner), 2);
        assert_eq!(bank.count("Physics", "Thermodynamics", Difficulty::Advanced), 0);
    }

    #[test]
    fn test_lookup_variants() {
        let bank = TemplateBank::builtin();
        assert!(matches!(
            bank.lookup("Mathematics", "Algebra", Difficulty::Beginner),
            Lookup::Hit(t) if t.len() == 3
        ));
        assert_eq!(
            bank.lookup("Underwater Basketweaving", "Algebra", Difficulty::Beginner),
            Lookup::UnknownSubject
        );
        assert_eq!(
            bank.lookup("Mathematics", "Topology", Difficulty::Beginner),
            Lookup::UnknownTopic
        );
        assert_eq!(
            bank.lookup("Chemistry", "Chemical Bonding", Difficulty::Advanced),
            Lookup::EmptyDifficulty
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let bank = TemplateBank::builtin();
        assert_eq!(
            bank.lookup("mathematics", "Algebra", Difficulty::Beginner),
            Lookup::UnknownSubject
        );
    }

    #[test]
    fn test_every_template_well_formed() {
        let bank = TemplateBank::builtin();
        for subject in bank.subjects() {
            for topic in bank.topics(subject) {
                for difficulty in Difficulty::ALL {
                    let Some(templates) = bank.lookup(subject, topic, difficulty).templates() else {
                        continue;
                    };
                    for t in templates {
                        assert_eq!(t.options.len(), OPTION_COUNT, "{}", t.question);
                        assert!(t.correct_answer < OPTION_COUNT, "{}", t.question);
                        assert!(!t.explanation.is_empty());
                        assert_eq!(t.improvement_areas.len(), 3);
                        assert_eq!(t.related_topics.len(), 3);
                    }
                }
            }
        }
    }

    #[test]
    fn test_insert_builds_custom_bank() {
        let mut bank = TemplateBank::new();
        assert_eq!(
            bank.lookup("Art", "Color", Difficulty::Beginner),
            Lookup::UnknownSubject
        );

        bank.insert("Art", "Color", Difficulty::Beginner, vec![template(
            "Which color is primary?",
            ["Red", "Green", "Orange", "Purple"],
            0,
            "Red is a primary pigment.",
            "Primary Colors",
            ["a", "b", "c"],
            "Nice!",
            ["x", "y", "z"],
        )]);
        assert_eq!(bank.count("Art", "Color", Difficulty::Beginner), 1);
        assert_eq!(
            bank.lookup("Art", "Color", Difficulty::Advanced),
            Lookup::EmptyDifficulty
        );
    }

    #[test]
    fn test_materialize_copies_content() {
        let bank = TemplateBank::builtin();
        let t = &bank
            .lookup("Mathematics", "Algebra", Difficulty::Beginner)
            .templates()
            .unwrap()[1];
        let mut q = t.materialize("q", "Algebra", Difficulty::Beginner, "Multiple Choice");
        assert_eq!(q.text, t.question);
        assert_eq!(q.correct_answer_index, 1);
        assert_eq!(q.concept.as_deref(), Some("Coefficients and Terms"));

        q.options[0] = "mutated".to_string();
        assert_eq!(t.options[0], "3");
    }

    #[test]
    fn test_template_serialization() {
        let bank = TemplateBank::builtin();
        let templates = bank
            .lookup("Physics", "Mechanics", Difficulty::Beginner)
            .templates()
            .unwrap();
        let json = serde_json::to_string(templates).unwrap();
        let parsed: Vec<QuestionTemplate> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_slice(), templates);
    }
}
