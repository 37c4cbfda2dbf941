//! Structured-output schema and instructions sent with every lesson request.

use crate::types::{GameType, FLASHCARD_COUNT, QUIZ_COUNT, SCRAMBLE_COUNT};
use serde_json::{json, Value};

/// Learners the lesson is written for.
pub const TARGET_AUDIENCE: &str = "middle school students learning to read and write";
/// CEFR level of the generated Italian.
pub const LANGUAGE_LEVEL: &str = "Level A1/Literacy";

pub const SYSTEM_INSTRUCTION: &str = "You are an expert Italian teacher for foreign students (L2). \
Focus on high-frequency vocabulary and simple grammar. Ensure quiz answers are unambiguous. \
Reply only with strict JSON matching the provided schema.";

/// Upper bound on items accepted by the schema.
pub const MAX_ITEMS: usize = FLASHCARD_COUNT + QUIZ_COUNT + SCRAMBLE_COUNT;

/// Response schema: `{ items: [{ type, flashcard?, quiz?, scramble? }] }`.
pub fn response_schema() -> Value {
    let tags: Vec<&str> = GameType::ALL.iter().map(|t| t.as_tag()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "items": {
                "type": "ARRAY",
                "maxItems": MAX_ITEMS,
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": { "type": "STRING", "enum": tags },
                        "flashcard": {
                            "type": "OBJECT",
                            "properties": {
                                "italian": { "type": "STRING", "description": "The word in Italian" },
                                "emoji": { "type": "STRING", "description": "A single emoji representing the word" },
                                "nativeHint": { "type": "STRING", "description": "A very simple hint in English" },
                                "exampleSentence": { "type": "STRING", "description": "Simple example sentence in Italian using the word" }
                            }
                        },
                        "quiz": {
                            "type": "OBJECT",
                            "properties": {
                                "question": { "type": "STRING", "description": "Simple question in Italian" },
                                "options": { "type": "ARRAY", "items": { "type": "STRING" }, "description": "4 possible answers" },
                                "correctAnswerIndex": { "type": "INTEGER", "description": "Index of the correct answer (0-3)" }
                            }
                        },
                        "scramble": {
                            "type": "OBJECT",
                            "properties": {
                                "sentence": { "type": "STRING", "description": "A simple correct Italian sentence" },
                                "words": { "type": "ARRAY", "items": { "type": "STRING" }, "description": "The words of the sentence in random order" }
                            }
                        }
                    },
                    "required": ["type"]
                }
            }
        },
        "required": ["items"]
    })
}

/// Natural-language instruction for one topic.
pub fn build_prompt(topic: &str) -> String {
    format!(
        "Create an Italian L2 (Second Language) lesson plan for beginner students ({level}).\n\
         The topic is: \"{topic}\".\n\
         \n\
         Generate {total} items total:\n\
         - {flashcards} FLASHCARDS: Introduce key vocabulary words related to the topic.\n\
         - {quizzes} QUIZZES: Simple multiple choice questions.\n\
         \x20 IMPORTANT FOR QUIZZES:\n\
         \x20 1. Provide 1 Correct Answer and 3 Distractors.\n\
         \x20 2. The Distractors must be CLEARLY WRONG and from a completely different category \
         to avoid confusion (e.g. if the answer is a person, distractors should be food or objects).\n\
         \x20 3. DOUBLE CHECK that 'correctAnswerIndex' points to the actual correct string in the 'options' array.\n\
         - {scrambles} SCRAMBLE: A simple sentence related to the topic that needs to be reordered.\n\
         \n\
         Use simple, clear Italian suitable for {audience}.",
        level = LANGUAGE_LEVEL,
        topic = topic,
        total = MAX_ITEMS,
        flashcards = FLASHCARD_COUNT,
        quizzes = QUIZ_COUNT,
        scrambles = SCRAMBLE_COUNT,
        audience = TARGET_AUDIENCE,
    )
}
