//! End-of-round handling: leaderboard, restart vote and reset

use crate::connection::Received;
use crate::messaging::Session;
use crate::player::Player;
use log::{debug, info};
use shared::{is_decline, ServerMessage, Standing};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteResult {
    Restart,
    End,
}

/// Ranks every registered player, eliminated and disconnected ones
/// included: points descending, then join order ascending.
pub fn leaderboard(players: &[Player]) -> Vec<Standing> {
    let mut ranked: Vec<&Player> = players.iter().collect();
    ranked.sort_by(|a, b| b.points.cmp(&a.points).then(a.order.cmp(&b.order)));

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, player)| Standing {
            rank: i + 1,
            order: player.order,
            nickname: player.nickname.clone(),
            points: player.points,
        })
        .collect()
}

/// Asks every connected player whether to play again.
///
/// Replies are read against one shared deadline; each connection buffers
/// its reply in its own inbox, so reading them one after the other is the
/// same as waiting on all of them at once. Silence counts as "n". A player
/// whose connection closes is dropped and does not vote.
pub async fn collect_votes(session: &mut Session, vote_timeout: Duration) -> VoteResult {
    for player in session.players_mut() {
        if let Some(connection) = player.connection_mut() {
            connection.discard_pending();
        }
    }
    session.broadcast(&ServerMessage::RestartPrompt).await;

    let deadline = Instant::now() + vote_timeout;
    let mut declined = false;

    for player in session.players_mut() {
        let Some(connection) = player.connection_mut() else {
            continue;
        };

        match connection.recv_until(deadline).await {
            Received::Line(vote) => {
                debug!("{} voted {:?}", player.nickname, vote);
                declined |= is_decline(&vote);
            }
            Received::TimedOut => {
                info!("{} did not vote in time", player.nickname);
                declined = true;
            }
            Received::Closed => {
                info!("{} left during the vote", player.nickname);
                player.disconnect();
            }
        }
    }

    if declined || session.connected_count() == 0 {
        VoteResult::End
    } else {
        VoteResult::Restart
    }
}

/// Puts every player back to the start-of-round state
pub fn reset(session: &mut Session) {
    for player in session.players_mut() {
        player.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use tokio::io::{duplex, AsyncWriteExt, DuplexStream};

    fn detached(name: &str, order: usize, points: u32) -> Player {
        let mut player = Player::detached(name, order);
        player.points = points;
        player
    }

    fn connected(name: &str, order: usize) -> (DuplexStream, Player) {
        let (peer, local) = duplex(1024);
        let addr = format!("127.0.0.1:{}", 6000 + order).parse().unwrap();
        (peer, Player::new(name, order, Connection::new(local, addr)))
    }

    #[test]
    fn test_leaderboard_orders_by_points_then_join_order() {
        let mut eliminated = detached("carol", 3, 2);
        eliminated.active = false;
        let players = vec![
            detached("alice", 1, 2),
            detached("bob", 2, 6),
            eliminated,
            detached("dave", 4, 0),
        ];

        let standings = leaderboard(&players);
        let names: Vec<&str> = standings.iter().map(|s| s.nickname.as_str()).collect();
        assert_eq!(names, vec!["bob", "alice", "carol", "dave"]);
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[0].points, 6);
        assert_eq!(standings[2].order, 3);
        assert_eq!(standings[3].rank, 4);
    }

    #[test]
    fn test_leaderboard_ties_use_join_order() {
        let players = vec![
            detached("zed", 1, 1),
            detached("amy", 2, 1),
            detached("bo", 3, 1),
        ];
        let standings = leaderboard(&players);
        let orders: Vec<usize> = standings.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_unanimous_yes_restarts() {
        let (mut alice_peer, alice) = connected("alice", 1);
        let (mut bob_peer, bob) = connected("bob", 2);
        let mut session = Session::new(vec![alice, bob]);

        alice_peer.write_all(b"y\n").await.unwrap();
        bob_peer.write_all(b"Y\n").await.unwrap();
        // Sent before the prompt, so these are discarded as early input
        tokio::time::sleep(Duration::from_millis(50)).await;

        let votes = tokio::spawn(async move {
            let result = collect_votes(&mut session, Duration::from_secs(5)).await;
            (result, session)
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        alice_peer.write_all(b"yes\n").await.unwrap();
        bob_peer.write_all(b"Y\n").await.unwrap();

        let (result, _session) = votes.await.unwrap();
        assert_eq!(result, VoteResult::Restart);
    }

    #[tokio::test]
    async fn test_single_no_ends_session() {
        let (mut alice_peer, alice) = connected("alice", 1);
        let (mut bob_peer, bob) = connected("bob", 2);
        let mut session = Session::new(vec![alice, bob]);

        let votes = tokio::spawn(async move {
            collect_votes(&mut session, Duration::from_secs(5)).await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        alice_peer.write_all(b"y\n").await.unwrap();
        bob_peer.write_all(b"N\n").await.unwrap();

        assert_eq!(votes.await.unwrap(), VoteResult::End);
    }

    #[tokio::test]
    async fn test_silence_counts_as_no() {
        let (mut alice_peer, alice) = connected("alice", 1);
        let (_bob_peer, bob) = connected("bob", 2);
        let mut session = Session::new(vec![alice, bob]);

        let votes = tokio::spawn(async move {
            collect_votes(&mut session, Duration::from_millis(200)).await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        alice_peer.write_all(b"y\n").await.unwrap();

        assert_eq!(votes.await.unwrap(), VoteResult::End);
    }

    #[tokio::test]
    async fn test_leaver_does_not_block_restart() {
        let (mut alice_peer, alice) = connected("alice", 1);
        let (bob_peer, bob) = connected("bob", 2);
        let mut session = Session::new(vec![alice, bob]);
        drop(bob_peer);

        let votes = tokio::spawn(async move {
            let result = collect_votes(&mut session, Duration::from_secs(5)).await;
            (result, session)
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        alice_peer.write_all(b"y\n").await.unwrap();

        let (result, session) = votes.await.unwrap();
        assert_eq!(result, VoteResult::Restart);
        assert!(!session.player(1).is_connected());
    }

    #[test]
    fn test_reset_restores_players() {
        let mut player = detached("alice", 1, 7);
        player.guesses_taken = 5;
        let mut session = Session::new(vec![player]);

        reset(&mut session);
        let player = session.player(0);
        assert_eq!(player.points, 0);
        assert_eq!(player.guesses_taken, 0);
        // Detached players stay out of play
        assert!(!player.active);
    }
}
