//! Tests for the session lifecycle, scoring and history listing.

use std::thread;

use chrono::Utc;
use tempfile::NamedTempFile;

use hangman_sessions::{
    GameError, GameOutcome, GameRepository, GameRules, GameService, NewGameRecord,
};

/// Fresh database with one player and the given words.
fn setup(words: &[&str]) -> (NamedTempFile, GameService, i32) {
    setup_with_rules(words, GameRules::default())
}

fn setup_with_rules(words: &[&str], rules: GameRules) -> (NamedTempFile, GameService, i32) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let repo = GameRepository::new(db_path).expect("Failed to create repository");
    repo.migrate().expect("Migrations failed");
    let player = repo
        .create_player("Alice".to_string())
        .expect("Create failed");

    let service = GameService::new(repo, rules);
    service
        .add_words(words.iter().map(|w| w.to_string()))
        .expect("Add words failed");
    (db_file, service, *player.id())
}

#[test]
fn test_start_session() {
    let (_db, service, player_id) = setup(&["cat"]);

    let response = service.start_session(player_id).expect("Start failed");
    assert_eq!(response.masked_word(), "___");
    assert!(response.attempted_letters().is_empty());
    assert_eq!(*response.remaining_attempts(), 7);
    assert!(!response.is_complete());
    assert_eq!(*response.score(), 0);
    assert_eq!(
        service.repository().count_unused_words().expect("Count failed"),
        0
    );
}

#[test]
fn test_start_unknown_player() {
    let (_db, service, _) = setup(&["cat"]);
    let result = service.start_session(9_999);
    assert!(matches!(
        result,
        Err(GameError::PlayerNotFound { player_id: 9_999 })
    ));
}

#[test]
fn test_start_without_words() {
    let (_db, service, player_id) = setup(&[]);
    let result = service.start_session(player_id);
    assert!(matches!(result, Err(GameError::NoWordsAvailable)));
}

#[test]
fn test_start_twice_resumes_same_round() {
    let (_db, service, player_id) = setup(&["cat", "dog"]);

    let first = service.start_session(player_id).expect("Start failed");
    let second = service.start_session(player_id).expect("Second start failed");

    assert_eq!(first, second);
    assert_eq!(
        service.repository().count_unused_words().expect("Count failed"),
        1,
        "Only one word should be marked used"
    );
}

#[test]
fn test_start_resumes_after_guesses() {
    let (_db, service, player_id) = setup(&["cat", "dog"]);
    service.start_session(player_id).expect("Start failed");
    let guessed = service.make_guess(player_id, 'z').expect("Guess failed");

    let resumed = service.start_session(player_id).expect("Start failed");
    assert_eq!(resumed, guessed);
    assert_eq!(*resumed.remaining_attempts(), 6);
}

#[test]
fn test_guess_unknown_player() {
    let (_db, service, _) = setup(&["cat"]);
    let result = service.make_guess(42, 'a');
    assert!(matches!(
        result,
        Err(GameError::PlayerNotFound { player_id: 42 })
    ));
}

#[test]
fn test_guess_without_session() {
    let (_db, service, player_id) = setup(&["cat"]);
    let result = service.make_guess(player_id, 'a');
    assert!(matches!(result, Err(GameError::NoActiveSession { .. })));
}

#[test]
fn test_guess_rejects_non_letters() {
    let (_db, service, player_id) = setup(&["cat"]);
    service.start_session(player_id).expect("Start failed");

    for bad in ['1', ' ', '_', ',', 'ª'] {
        let result = service.make_guess(player_id, bad);
        assert!(
            matches!(result, Err(GameError::InvalidLetter { letter }) if letter == bad),
            "{bad:?} should be rejected"
        );
    }

    let response = service.make_guess(player_id, 'x').expect("Guess failed");
    assert_eq!(*response.remaining_attempts(), 6);
}

#[test]
fn test_winning_round() {
    let (_db, service, player_id) = setup(&["cat"]);
    service.start_session(player_id).expect("Start failed");

    let response = service.make_guess(player_id, 'C').expect("Guess failed");
    assert_eq!(response.masked_word(), "C__");
    assert_eq!(*response.remaining_attempts(), 7);
    assert!(!response.is_complete());
    assert_eq!(*response.score(), 0);

    let response = service.make_guess(player_id, 'A').expect("Guess failed");
    assert_eq!(response.masked_word(), "CA_");
    assert_eq!(*response.remaining_attempts(), 7);
    assert!(service.list_all_games().expect("List failed").is_empty());

    let response = service.make_guess(player_id, 'T').expect("Guess failed");
    assert_eq!(response.masked_word(), "CAT");
    assert_eq!(*response.remaining_attempts(), 7);
    assert!(response.is_complete());
    assert_eq!(*response.score(), 20);

    let games = service.list_all_games().expect("List failed");
    assert_eq!(games.len(), 1);
    assert_eq!(*games[0].outcome(), GameOutcome::Won);
    assert_eq!(*games[0].score(), 20);
    assert_eq!(*games[0].player_id(), player_id);
    assert_eq!(games[0].player_name(), "Alice");
    assert_eq!(games[0].word_text().as_deref(), Some("CAT"));
}

#[test]
fn test_losing_round() {
    let (_db, service, player_id) = setup(&["cat"]);
    service.start_session(player_id).expect("Start failed");

    let mut response = None;
    for letter in ['X', 'Y', 'Z', 'Q', 'W'] {
        response = Some(service.make_guess(player_id, letter).expect("Guess failed"));
    }
    let response = response.expect("No guesses made");
    assert_eq!(*response.remaining_attempts(), 2);
    assert!(!response.is_complete());
    assert!(service.list_all_games().expect("List failed").is_empty());

    service.make_guess(player_id, 'E').expect("Guess failed");
    let response = service.make_guess(player_id, 'R').expect("Guess failed");
    assert_eq!(*response.remaining_attempts(), 0);
    assert!(!response.is_complete());
    assert_eq!(*response.score(), 0);
    assert_eq!(response.masked_word(), "___");

    let games = service
        .list_games_by_player(player_id)
        .expect("List failed");
    assert_eq!(games.len(), 1);
    assert_eq!(*games[0].outcome(), GameOutcome::Lost);
    assert_eq!(*games[0].score(), 0);
}

#[test]
fn test_lost_round_scores_correct_letters() {
    let (_db, service, player_id) = setup(&["cat"]);
    service.start_session(player_id).expect("Start failed");

    service.make_guess(player_id, 'c').expect("Guess failed");
    service.make_guess(player_id, 'a').expect("Guess failed");
    let mut last = None;
    for letter in "qwerxyz".chars() {
        last = Some(service.make_guess(player_id, letter).expect("Guess failed"));
    }

    let last = last.expect("No guesses made");
    assert_eq!(*last.remaining_attempts(), 0);
    assert_eq!(*last.score(), 2);
    assert_eq!(last.masked_word(), "CA_");
}

#[test]
fn test_repeated_guess_is_free() {
    let (_db, service, player_id) = setup(&["cat"]);
    service.start_session(player_id).expect("Start failed");

    let first = service.make_guess(player_id, 'x').expect("Guess failed");
    let again = service.make_guess(player_id, 'x').expect("Guess failed");
    let upper = service.make_guess(player_id, 'X').expect("Guess failed");

    assert_eq!(first, again);
    assert_eq!(first, upper);
    assert_eq!(*again.remaining_attempts(), 6);

    let hit = service.make_guess(player_id, 'c').expect("Guess failed");
    let hit_again = service.make_guess(player_id, 'c').expect("Guess failed");
    assert_eq!(hit.masked_word(), hit_again.masked_word());
    assert_eq!(hit.remaining_attempts(), hit_again.remaining_attempts());
}

#[test]
fn test_guess_after_round_over_changes_nothing() {
    let (_db, service, player_id) = setup(&["cat"]);
    service.start_session(player_id).expect("Start failed");
    for letter in ['c', 'a', 't'] {
        service.make_guess(player_id, letter).expect("Guess failed");
    }

    let after = service.make_guess(player_id, 'z').expect("Guess failed");
    assert!(after.is_complete());
    assert_eq!(*after.remaining_attempts(), 7);
    assert_eq!(*after.score(), 20);
    assert!(!after.attempted_letters().contains(&'Z'));

    assert_eq!(service.list_all_games().expect("List failed").len(), 1);
}

#[test]
fn test_new_round_after_finish_draws_new_word() {
    let (_db, service, player_id) = setup(&["ox", "ax"]);
    service.start_session(player_id).expect("Start failed");
    for letter in ['o', 'a', 'x'] {
        service.make_guess(player_id, letter).expect("Guess failed");
    }
    assert_eq!(service.list_all_games().expect("List failed").len(), 1);

    let next = service.start_session(player_id).expect("Second start failed");
    assert_eq!(next.masked_word(), "__");
    assert_eq!(*next.remaining_attempts(), 7);
    assert_eq!(
        service.repository().count_unused_words().expect("Count failed"),
        0
    );

    assert!(matches!(
        service.start_session(player_id),
        Ok(ref resumed) if resumed == &next
    ));
}

#[test]
fn test_spaces_are_revealed() {
    let (_db, service, player_id) = setup(&["ice cream"]);
    let response = service.start_session(player_id).expect("Start failed");
    assert_eq!(response.masked_word(), "___ _____");

    let response = service.make_guess(player_id, 'e').expect("Guess failed");
    assert_eq!(response.masked_word(), "__E __E__");
}

#[test]
fn test_custom_rules() {
    let rules = GameRules::default()
        .with_max_attempts(2)
        .with_points_per_letter(5);
    let (_db, service, player_id) = setup_with_rules(&["cat"], rules);

    let response = service.start_session(player_id).expect("Start failed");
    assert_eq!(*response.remaining_attempts(), 2);

    service.make_guess(player_id, 't').expect("Guess failed");
    service.make_guess(player_id, 'x').expect("Guess failed");
    let response = service.make_guess(player_id, 'y').expect("Guess failed");

    assert_eq!(*response.remaining_attempts(), 0);
    assert_eq!(*response.score(), 5);
}

#[test]
fn test_history_filters_by_player() {
    let (_db, service, alice) = setup(&["ox", "ax"]);
    let bob = *service
        .repository()
        .create_player("Bob".to_string())
        .expect("Create failed")
        .id();

    for player_id in [alice, bob] {
        service.start_session(player_id).expect("Start failed");
        for letter in ['o', 'a', 'x'] {
            service.make_guess(player_id, letter).expect("Guess failed");
        }
    }

    let all = service.list_all_games().expect("List failed");
    assert_eq!(all.len(), 2);

    let bobs = service.list_games_by_player(bob).expect("List failed");
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].player_name(), "Bob");

    assert!(service.list_games_by_player(9_999).expect("List failed").is_empty());
}

#[test]
fn test_add_words_validation() {
    let (_db, service, _) = setup(&[]);

    let result = service.add_words(["good".to_string(), "b4d".to_string()]);
    assert!(matches!(result, Err(GameError::InvalidWord { .. })));
    assert_eq!(
        service.repository().count_unused_words().expect("Count failed"),
        0,
        "Nothing is added when any word is invalid"
    );

    let result = service.add_words(["two  spaces".to_string()]);
    assert!(matches!(result, Err(GameError::InvalidWord { .. })));

    let added = service
        .add_words(["  fine ".to_string(), String::new(), "ice cream".to_string()])
        .expect("Add failed");
    let texts: Vec<_> = added.iter().map(|w| w.text().as_str()).collect();
    assert_eq!(texts, ["FINE", "ICE CREAM"]);
}

#[test]
fn test_add_words_duplicate_rolls_back_batch() {
    let (_db, service, _) = setup(&["owl"]);

    let result = service.add_words(["cat".to_string(), "dog".to_string(), "CAT".to_string()]);
    assert!(matches!(result, Err(GameError::Database(_))));
    assert_eq!(
        service.repository().count_unused_words().expect("Count failed"),
        1,
        "A duplicate within the batch adds nothing"
    );

    let result = service.add_words(["emu".to_string(), "owl".to_string()]);
    assert!(matches!(result, Err(GameError::Database(_))));
    assert_eq!(
        service.repository().count_unused_words().expect("Count failed"),
        1,
        "A word already stored adds nothing"
    );
}

#[test]
fn test_failed_finalize_rolls_back_guess() {
    let (_db, service, player_id) = setup(&["cat"]);
    service.start_session(player_id).expect("Start failed");
    service.make_guess(player_id, 'c').expect("Guess failed");
    service.make_guess(player_id, 'a').expect("Guess failed");

    // Occupy the session's history slot so the winning guess cannot record it.
    let session = service
        .repository()
        .write(|store| {
            let session = store
                .find_latest_session(player_id)?
                .expect("Session missing");
            store.insert_game_record(NewGameRecord::new(
                player_id,
                Some(*session.word_id()),
                Some(*session.id()),
                GameOutcome::Lost.to_db_string().to_string(),
                0,
                Utc::now().naive_utc(),
            ))?;
            Ok::<_, GameError>(session)
        })
        .expect("Write failed");

    let result = service.make_guess(player_id, 't');
    assert!(matches!(result, Err(GameError::Database(_))));

    let stored = service
        .repository()
        .read(|store| store.find_latest_session(player_id))
        .expect("Query failed")
        .expect("Session missing");
    assert_eq!(stored.id(), session.id());
    assert_eq!(stored.attempted_letters(), "A,C");
    assert_eq!(*stored.remaining_attempts(), 7);

    let resumed = service.start_session(player_id).expect("Start failed");
    assert_eq!(resumed.masked_word(), "CA_");
    assert!(!resumed.is_complete());
}

#[test]
fn test_concurrent_guesses_are_serialized() {
    let (_db, service, player_id) = setup(&["cat"]);
    service.start_session(player_id).expect("Start failed");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            thread::spawn(move || service.make_guess(player_id, 'z'))
        })
        .collect();

    for handle in handles {
        handle
            .join()
            .expect("Thread panicked")
            .expect("Guess failed");
    }

    let response = service.make_guess(player_id, 'z').expect("Guess failed");
    assert_eq!(*response.remaining_attempts(), 6);
}
