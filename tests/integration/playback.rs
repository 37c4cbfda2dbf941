//! Playback from a shared link through a finished lesson.

use super::test_utils::sample_plan;
use itafacile::error::{GenerationError, GenerationErrorKind};
use itafacile::exercise::{flashcard_faces, QuizAttempt, ScrambleBoard, ScrambleStatus};
use itafacile::session::{
    classroom_share_url, share_url, BeginError, DeepLink, PlaybackSession, PlaybackState,
    DEFAULT_SHARE_BASE_URL,
};
use itafacile::types::GameContent;

fn solve(board: &mut ScrambleBoard, words: &[&str]) -> ScrambleStatus {
    for word in words {
        let id = board
            .available()
            .iter()
            .find(|token| token.word == *word)
            .map(|token| token.id)
            .unwrap();
        assert!(board.pick(id));
    }
    board.check()
}

#[test]
fn shared_link_autoplays_the_topic_once() {
    let url = share_url(DEFAULT_SHARE_BASE_URL, "Cibo e bevande");
    assert_eq!(url, "itafacile://play?topic=Cibo%20e%20bevande&autoplay=true");

    let link = DeepLink::parse(&url).unwrap();
    let mut session = PlaybackSession::with_deep_link(link);
    assert_eq!(session.topic(), "Cibo e bevande");

    let link = session.take_autoplay().unwrap();
    assert_eq!(link.topic, "Cibo e bevande");
    assert!(session.take_autoplay().is_none());
}

#[test]
fn classroom_link_wraps_the_share_link() {
    let url = classroom_share_url("https://app.example.com/", "Animali");
    let (base, query) = url.split_once("?url=").unwrap();
    assert_eq!(base, "https://classroom.google.com/share");

    let inner = urlencoding::decode(query).unwrap();
    assert_eq!(
        inner,
        "https://app.example.com/?topic=Animali&autoplay=true"
    );
    assert_eq!(DeepLink::parse(&inner).unwrap().topic, "Animali");
}

#[test]
fn link_without_autoplay_only_fills_the_topic() {
    let link = DeepLink::parse("https://app.example.com/?topic=La+scuola").unwrap();
    assert!(!link.autoplay);

    let mut session = PlaybackSession::with_deep_link(link);
    assert_eq!(session.topic(), "La scuola");
    assert!(session.take_autoplay().is_none());
    assert!(matches!(session.state(), PlaybackState::Idle));
}

#[test]
fn generated_lesson_plays_to_completion() {
    let mut session = PlaybackSession::new();
    session.begin_generation("  Animali ").unwrap();
    assert_eq!(
        session.begin_generation("Cibo"),
        Err(BeginError::AlreadyLoading)
    );
    session.finish_generation(Ok(sample_plan("Animali")));
    assert_eq!(session.progress(), Some((0, 3)));

    let mut correct_quizzes = 0;
    while let Some(item) = session.current_item().cloned() {
        match &item.content {
            GameContent::Flashcard(card) => {
                let faces = flashcard_faces(card);
                assert_eq!(faces.front, "🐶  cane");
                assert_eq!(faces.back, "(dog)\n\"Il cane corre.\"");
            }
            GameContent::Quiz(quiz) => {
                let mut attempt = QuizAttempt::new(quiz);
                let feedback = attempt.select(0);
                // a second pick cannot change a locked answer
                assert_eq!(attempt.select(2), feedback);
                correct_quizzes += usize::from(feedback.correct);
            }
            GameContent::Scramble(scramble) => {
                let mut board = ScrambleBoard::new(scramble);
                assert_eq!(
                    solve(&mut board, &["cane", "Il", "corre."]),
                    ScrambleStatus::Wrong
                );
                board.reset();
                assert_eq!(
                    solve(&mut board, &["Il", "cane", "corre."]),
                    ScrambleStatus::Correct
                );
            }
        }
        session.advance();
    }

    assert_eq!(correct_quizzes, 1);
    assert!(matches!(session.state(), PlaybackState::Complete { .. }));
    assert_eq!(session.progress(), Some((3, 3)));

    session.restart();
    assert_eq!(session.topic(), "");
    assert!(matches!(session.state(), PlaybackState::Idle));
}

#[test]
fn failed_generation_can_be_retried() {
    let mut session = PlaybackSession::new();
    session.begin_generation("Animali").unwrap();
    session.finish_generation(Err(GenerationError::new(
        GenerationErrorKind::RateLimited,
        "429 RESOURCE_EXHAUSTED",
    )));

    match session.state() {
        PlaybackState::Failed { message } => {
            assert_eq!(message, GenerationErrorKind::RateLimited.user_message())
        }
        other => panic!("expected a failed state, got {:?}", other),
    }
    assert_eq!(session.topic(), "Animali");

    session.begin_generation("Animali").unwrap();
    assert!(session.is_loading());
}

#[test]
fn blank_topic_is_refused() {
    let mut session = PlaybackSession::new();
    assert_eq!(session.begin_generation("   "), Err(BeginError::EmptyTopic));
    assert!(matches!(session.state(), PlaybackState::Idle));
}
