use actix_web::web;

pub mod auth;
pub mod backend_health;
pub mod matches;
pub mod players;
pub mod registration;
pub mod team;
pub mod tournament;

use crate::middleware::auth::AuthMiddleware;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(registration::register)
        .service(backend_health::backend_health)
        .service(auth::login);

    // Team roster routes (require authentication)
    cfg.service(
        web::scope("/teams")
            .wrap(AuthMiddleware)
            .service(team::create_team)
            .service(team::add_team_member)
            .service(team::get_team_members)
    );
    // Tournament lifecycle and derived views (require authentication)
    cfg.service(
        web::scope("/tournaments")
            .wrap(AuthMiddleware)
            .service(tournament::create_tournament)
            .service(tournament::list_tournaments)
            .service(tournament::add_team)
            .service(tournament::start_tournament)
            .service(tournament::end_tournament)
            .service(tournament::list_matches)
            .service(tournament::get_points_table)
            .service(tournament::get_leaderboard)
    );
    // Match scoring workflow (require authentication)
    cfg.service(
        web::scope("/tournament-matches")
            .wrap(AuthMiddleware)
            .service(matches::create_match)
            .service(matches::start_match)
            .service(matches::set_batsmen)
            .service(matches::set_bowler)
            .service(matches::add_score)
            .service(matches::add_wicket)
            .service(matches::switch_innings)
            .service(matches::complete_match)
            .service(matches::cancel_match)
            .service(matches::get_match_state)
            .service(matches::get_match_player_stats)
            .service(matches::get_match_events)
    );
    // Player dashboards (require authentication)
    cfg.service(
        web::scope("/players")
            .wrap(AuthMiddleware)
            .service(players::get_career_stats)
            .service(players::get_achievements)
    );
}
