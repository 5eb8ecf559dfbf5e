use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::domain::{AnswerOption, Difficulty, Question, QuestionId};

/// Immutable question reference data, validated once when the engine is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        if questions.is_empty() {
            return Err(QuestionBankError::Empty);
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id) {
                return Err(QuestionBankError::DuplicateId(question.id));
            }
            if !question.has_option(&question.correct_answer) {
                return Err(QuestionBankError::UnknownAnswerKey {
                    id: question.id,
                    answer: question.correct_answer.clone(),
                });
            }
        }

        Ok(Self { questions })
    }

    pub fn from_json<R: Read>(reader: R) -> Result<Self, QuestionBankError> {
        let questions: Vec<Question> = serde_json::from_reader(reader)?;
        Self::new(questions)
    }

    pub fn from_path(path: &Path) -> Result<Self, QuestionBankError> {
        let file = File::open(path).map_err(|source| QuestionBankError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(BufReader::new(file))
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The five-question Information Assurance starter bank.
    pub fn builtin() -> Self {
        Self {
            questions: builtin_questions(),
        }
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuestionBankError {
    #[error("question bank is empty")]
    Empty,
    #[error("question id {0} appears more than once")]
    DuplicateId(QuestionId),
    #[error("question {id} answer key '{answer}' is not one of its options")]
    UnknownAnswerKey { id: QuestionId, answer: String },
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed question bank: {0}")]
    Parse(#[from] serde_json::Error),
}

fn question(
    id: u32,
    category: &str,
    prompt: &str,
    options: [(&str, &str); 4],
    correct_answer: &str,
    difficulty: Difficulty,
) -> Question {
    Question {
        id: QuestionId(id),
        category: category.to_string(),
        prompt: prompt.to_string(),
        options: options
            .iter()
            .map(|(label, text)| AnswerOption::new(label, text))
            .collect(),
        correct_answer: correct_answer.to_string(),
        difficulty,
    }
}

fn builtin_questions() -> Vec<Question> {
    vec![
        question(
            1,
            "Security Fundamentals",
            "What is the primary goal of information security?",
            [
                ("A", "To encrypt all data"),
                (
                    "B",
                    "To ensure confidentiality, integrity, and availability of information",
                ),
                ("C", "To prevent all access to systems"),
                ("D", "To maximize system performance"),
            ],
            "B",
            Difficulty::Easy,
        ),
        question(
            2,
            "Network Security",
            "What does a firewall primarily protect against?",
            [
                ("A", "Virus infections"),
                ("B", "Unauthorized network access"),
                ("C", "Hardware failures"),
                ("D", "Power outages"),
            ],
            "B",
            Difficulty::Easy,
        ),
        question(
            3,
            "Cryptography",
            "Which of the following is a symmetric encryption algorithm?",
            [("A", "RSA"), ("B", "ECC"), ("C", "AES"), ("D", "DSA")],
            "C",
            Difficulty::Medium,
        ),
        question(
            4,
            "Access Control",
            "What is the principle of least privilege?",
            [
                ("A", "Give users maximum access"),
                (
                    "B",
                    "Grant users only the access they need to perform their job",
                ),
                ("C", "Allow all system access"),
                ("D", "Restrict all access"),
            ],
            "B",
            Difficulty::Easy,
        ),
        question(
            5,
            "Incident Response",
            "What is the first step in incident response?",
            [
                ("A", "Eradication"),
                ("B", "Detection and analysis"),
                ("C", "Recovery"),
                ("D", "Post-incident activities"),
            ],
            "B",
            Difficulty::Medium,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_bank_passes_validation() {
        let bank = QuestionBank::new(builtin_questions()).expect("builtin bank is valid");
        assert_eq!(bank.len(), 5);
        assert_eq!(bank.get(QuestionId(3)).map(|q| q.correct_answer.as_str()), Some("C"));
        assert!(bank.get(QuestionId(99)).is_none());
    }

    #[test]
    fn loads_bank_from_json() {
        let json = r#"[
            {
                "id": 10,
                "category": "Cryptography",
                "prompt": "Which algorithm is a hash function?",
                "options": [
                    {"label": "A", "text": "SHA-256"},
                    {"label": "B", "text": "AES"}
                ],
                "correct_answer": "A",
                "difficulty": "Hard"
            }
        ]"#;

        let bank = QuestionBank::from_json(json.as_bytes()).expect("bank parses");
        let question = bank.get(QuestionId(10)).expect("question present");
        assert_eq!(question.difficulty, Difficulty::Hard);
        assert_eq!(question.options.len(), 2);
    }

    #[test]
    fn rejects_duplicate_ids_and_unknown_answer_keys() {
        let mut duplicated = builtin_questions();
        duplicated[1].id = QuestionId(1);
        assert!(matches!(
            QuestionBank::new(duplicated),
            Err(QuestionBankError::DuplicateId(QuestionId(1)))
        ));

        let mut bad_key = builtin_questions();
        bad_key[0].correct_answer = "E".to_string();
        assert!(matches!(
            QuestionBank::new(bad_key),
            Err(QuestionBankError::UnknownAnswerKey { .. })
        ));

        assert!(matches!(
            QuestionBank::new(Vec::new()),
            Err(QuestionBankError::Empty)
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            QuestionBank::from_json("{not json".as_bytes()),
            Err(QuestionBankError::Parse(_))
        ));
    }
}
