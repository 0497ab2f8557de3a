//! Scripted full-match scenarios driven through the public scoring API.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use pitchside_backend::scoring::engine::decide_winner;
use pitchside_backend::scoring::{LiveState, ScoringError, MAX_WICKETS};

struct Side {
    players: Vec<Uuid>,
    roster: HashSet<Uuid>,
}

impl Side {
    fn new(size: usize) -> Self {
        let players: Vec<Uuid> = (0..size).map(|_| Uuid::new_v4()).collect();
        let roster = players.iter().copied().collect();
        Self { players, roster }
    }
}

/// Drives one innings ball by ball, re-assigning the bowler at every over
/// boundary and bringing in the next batsman on every wicket, the way the
/// scoring UI does.
struct InningsDriver<'a> {
    batting: &'a Side,
    bowling: &'a Side,
    dismissed: HashSet<Uuid>,
    next_batsman: usize,
    runs_by_player: HashMap<Uuid, i32>,
}

impl<'a> InningsDriver<'a> {
    fn new(state: &mut LiveState, batting: &'a Side, bowling: &'a Side) -> Self {
        state
            .set_batsmen(
                batting.players[0],
                batting.players[1],
                batting.players[0],
                &batting.roster,
                &HashSet::new(),
            )
            .expect("opening batsmen should be accepted");
        state
            .set_bowler(bowling.players[0], &bowling.roster)
            .expect("opening bowler should be accepted");
        Self {
            batting,
            bowling,
            dismissed: HashSet::new(),
            next_batsman: 2,
            runs_by_player: HashMap::new(),
        }
    }

    fn ensure_bowler(&self, state: &mut LiveState) {
        if state.current_bowler.is_none() {
            let bowler = self.bowling.players[(state.current_over as usize) % self.bowling.players.len()];
            state
                .set_bowler(bowler, &self.bowling.roster)
                .expect("bowler should be accepted");
        }
    }

    fn score(&mut self, state: &mut LiveState, runs: i32) {
        self.ensure_bowler(state);
        let applied = state.add_score(runs, None).expect("ball should apply");
        *self.runs_by_player.entry(applied.striker).or_default() += runs;
    }

    fn wicket(&mut self, state: &mut LiveState) {
        self.ensure_bowler(state);
        let next = if state.batting_wickets + 1 >= MAX_WICKETS {
            None
        } else {
            let candidate = self.batting.players[self.next_batsman];
            self.next_batsman += 1;
            Some(candidate)
        };
        let applied = state
            .add_wicket(next, &self.batting.roster, &self.dismissed, None)
            .expect("wicket should apply");
        self.dismissed.insert(applied.dismissed);
    }
}

#[test]
fn chase_scenario_produces_the_expected_winner() {
    // Team A bats first and puts up 150/6 in 20 overs; team B chases it
    // down with 151/4. B must come out the winner.
    let team_a = Uuid::new_v4();
    let team_b = Uuid::new_v4();
    let side_a = Side::new(11);
    let side_b = Side::new(11);

    let mut state = LiveState::new(20);
    let mut driver = InningsDriver::new(&mut state, &side_a, &side_b);

    // Twelve overs of alternating twos and singles (9 each), six overs of
    // five singles plus a wicket (5 each), two overs of singles (6 each):
    // 108 + 30 + 12 = 150, six down.
    for over in 0..20 {
        for ball in 0..6 {
            match (over, ball) {
                (12..=17, 5) => driver.wicket(&mut state),
                (0..=11, b) if b % 2 == 0 => driver.score(&mut state, 2),
                _ => driver.score(&mut state, 1),
            }
        }
    }
    let first_innings_total = state.batting_runs;
    assert_eq!(first_innings_total, 150);
    assert_eq!(state.batting_wickets, 6);
    assert_eq!(state.current_over, 20);
    assert!(matches!(state.add_score(1, None), Err(ScoringError::OversExhausted)));

    // Per-player tallies must add up to the team total.
    let scripted_sum: i32 = driver.runs_by_player.values().sum();
    assert_eq!(scripted_sum, first_innings_total);

    let target = state.switch_innings().expect("switch after first innings");
    assert_eq!(target, first_innings_total);
    assert_eq!(state.target_runs, Some(first_innings_total));

    // Second innings: bat until the target is passed.
    let mut driver = InningsDriver::new(&mut state, &side_b, &side_a);
    let mut wickets_spent = 0;
    while state.batting_runs <= target {
        if state.current_ball == 2 && wickets_spent < 4 && state.current_over > 0 {
            driver.wicket(&mut state);
            wickets_spent += 1;
        } else {
            driver.score(&mut state, 4);
        }
    }
    let second_innings_total = state.batting_runs;
    assert!(second_innings_total > first_innings_total);
    assert_eq!(state.batting_wickets, 4);
    // The chase finished within the allotted overs.
    assert!(state.current_over < 20);

    let winner = decide_winner(team_a, team_b, first_innings_total, second_innings_total);
    assert_eq!(winner, Some(team_b));
}

#[test]
fn all_out_ends_the_innings_without_a_replacement() {
    let side_a = Side::new(11);
    let side_b = Side::new(11);
    let mut state = LiveState::new(50);
    let mut driver = InningsDriver::new(&mut state, &side_a, &side_b);

    for _ in 0..4 {
        driver.score(&mut state, 1);
    }
    for _ in 0..MAX_WICKETS {
        driver.wicket(&mut state);
    }
    assert_eq!(state.batting_wickets, MAX_WICKETS);
    assert_eq!(state.current_striker, None);
    assert!(matches!(state.add_score(0, None), Err(ScoringError::AllOut)));

    // The operator switches innings; the other side can bat normally.
    let target = state.switch_innings().expect("switch after all out");
    assert_eq!(target, 4);
    let mut driver = InningsDriver::new(&mut state, &side_b, &side_a);
    driver.score(&mut state, 6);
    assert_eq!(state.batting_runs, 6);
}

#[test]
fn ledger_sequence_increases_by_one_per_ball() {
    let side_a = Side::new(11);
    let side_b = Side::new(11);
    let mut state = LiveState::new(20);
    let mut driver = InningsDriver::new(&mut state, &side_a, &side_b);

    let mut expected = 1;
    for runs in [0, 1, 4, 6, 2, 0, 3, 1] {
        driver.ensure_bowler(&mut state);
        let applied = state.add_score(runs, None).unwrap();
        assert_eq!(applied.sequence, expected);
        expected += 1;
    }
    // The sequence survives the innings switch untouched.
    state.switch_innings().unwrap();
    let mut driver2 = InningsDriver::new(&mut state, &side_b, &side_a);
    driver2.score(&mut state, 1);
    assert_eq!(state.total_balls_bowled, expected);
}

#[test]
fn dismissed_batsman_cannot_be_selected_again() {
    let side_a = Side::new(11);
    let side_b = Side::new(11);
    let mut state = LiveState::new(20);
    let mut driver = InningsDriver::new(&mut state, &side_a, &side_b);

    let first_out = state.current_striker.unwrap();
    driver.wicket(&mut state);

    let err = state
        .set_batsmen(
            first_out,
            side_a.players[5],
            first_out,
            &side_a.roster,
            &driver.dismissed,
        )
        .unwrap_err();
    assert!(matches!(err, ScoringError::InvalidBatsman(_)));
}
