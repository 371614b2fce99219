//! Points, badges, challenges, and the leaderboard
//!
//! Completed trips feed into a player's [`GameState`]. The leaderboard is
//! always derived from the roster on demand.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::summary::TripSummary;
use super::types::EcoScore;

/// A registered rider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub points: i64,
    pub badges: Vec<String>,
    pub joined_at: DateTime<Utc>,
    pub is_admin: bool,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            points: 0,
            badges: Vec::new(),
            joined_at: Utc::now(),
            is_admin: false,
        }
    }

    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges.iter().any(|b| b == badge)
    }
}

/// What a challenge counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    /// km driven
    Distance,
    /// Trips finished with an A eco-score
    Eco,
    /// Trips finished without obstacles
    Safety,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Awarded once, when the target is first reached
    pub points: i64,
    pub progress: f64,
    pub target: f64,
    pub kind: ChallengeKind,
    pub completed: bool,
}

impl Challenge {
    pub fn new(
        id: &str,
        title: &str,
        description: &str,
        points: i64,
        target: f64,
        kind: ChallengeKind,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            points,
            progress: 0.0,
            target,
            kind,
            completed: false,
        }
    }

    /// Add progress, capped at the target. Returns true if this call
    /// completed the challenge.
    pub fn advance(&mut self, amount: f64) -> bool {
        self.progress = (self.progress + amount.max(0.0)).min(self.target);
        let just_completed = !self.completed && self.progress >= self.target;
        if self.progress >= self.target {
            self.completed = true;
        }
        just_completed
    }

    /// Progress as a percentage of the target
    pub fn percent(&self) -> f64 {
        if self.target <= 0.0 {
            return 100.0;
        }
        (self.progress / self.target * 100.0).min(100.0)
    }
}

/// The challenges every new player starts with
pub fn default_challenges() -> Vec<Challenge> {
    vec![
        Challenge::new(
            "1",
            "Green Mile",
            "Travel 5km in eco-mode",
            50,
            5.0,
            ChallengeKind::Distance,
        ),
        Challenge::new(
            "2",
            "Safe Journey",
            "Complete a trip with no obstacles",
            100,
            1.0,
            ChallengeKind::Safety,
        ),
        Challenge::new(
            "3",
            "Eco Warrior",
            "Achieve an A eco-score on 3 trips",
            150,
            3.0,
            ChallengeKind::Eco,
        ),
    ]
}

/// Something the player was given for a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Award {
    Points(i64),
    Badge(String),
    ChallengeCompleted { title: String, points: i64 },
}

/// A player's progress across trips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub user: UserProfile,
    pub challenges: Vec<Challenge>,
    /// Trips applied so far
    pub trips_completed: usize,
}

impl GameState {
    pub fn new(user: UserProfile) -> Self {
        Self {
            user,
            challenges: default_challenges(),
            trips_completed: 0,
        }
    }

    pub fn earn(&mut self, points: i64) {
        self.user.points += points;
    }

    /// Returns false if the badge was already held
    pub fn add_badge(&mut self, badge: &str) -> bool {
        if self.user.has_badge(badge) {
            return false;
        }
        self.user.badges.push(badge.to_string());
        true
    }

    /// Advance every challenge of `kind`, paying out those that complete
    fn progress_challenges(&mut self, kind: ChallengeKind, amount: f64) -> Vec<Award> {
        let mut completed = Vec::new();
        for challenge in self.challenges.iter_mut().filter(|c| c.kind == kind) {
            if challenge.advance(amount) {
                completed.push((challenge.title.clone(), challenge.points));
            }
        }

        completed
            .into_iter()
            .map(|(title, points)| {
                self.earn(points);
                Award::ChallengeCompleted { title, points }
            })
            .collect()
    }

    /// Credit a finished trip: its points, any new badges, and challenge
    /// progress. Returns everything awarded.
    pub fn apply_trip(&mut self, trip: &TripSummary) -> Vec<Award> {
        let mut awards = Vec::new();
        self.trips_completed += 1;

        self.earn(trip.points_earned);
        awards.push(Award::Points(trip.points_earned));

        for badge in &trip.badges {
            if self.add_badge(badge) {
                awards.push(Award::Badge(badge.clone()));
            }
        }

        awards.extend(self.progress_challenges(ChallengeKind::Distance, trip.distance()));
        if trip.obstacles_encountered() == 0 {
            awards.extend(self.progress_challenges(ChallengeKind::Safety, 1.0));
        }
        if trip.eco_score() == EcoScore::A {
            awards.extend(self.progress_challenges(ChallengeKind::Eco, 1.0));
        }

        awards
    }

    pub fn summary(&self) -> String {
        format!(
            "{} | Points: {} | Badges: {} | Trips: {} | Challenges: {}/{}",
            self.user.name,
            self.user.points,
            self.user.badges.len(),
            self.trips_completed,
            self.challenges.iter().filter(|c| c.completed).count(),
            self.challenges.len()
        )
    }
}

/// A row of the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub name: String,
    pub points: i64,
    pub badges: usize,
}

/// Rank users by points, highest first. Ties keep roster order.
pub fn leaderboard(users: &[UserProfile]) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&UserProfile> = users.iter().collect();
    sorted.sort_by(|a, b| b.points.cmp(&a.points));
    sorted
        .into_iter()
        .enumerate()
        .map(|(index, user)| LeaderboardEntry {
            rank: index + 1,
            user_id: user.id.clone(),
            name: user.name.clone(),
            points: user.points,
            badges: user.badges.len(),
        })
        .collect()
}

fn demo_user(
    id: &str,
    name: &str,
    email: &str,
    points: i64,
    badges: &[&str],
    joined: (i32, u32, u32),
    is_admin: bool,
) -> UserProfile {
    let (year, month, day) = joined;
    UserProfile {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        points,
        badges: badges.iter().map(|b| b.to_string()).collect(),
        joined_at: Utc
            .with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
        is_admin,
    }
}

/// The synthetic riders shown in the demo
pub fn demo_roster() -> Vec<UserProfile> {
    vec![
        demo_user(
            "1",
            "John Doe",
            "john@example.com",
            1250,
            &["Eco Champion", "Safe Driver", "Speed Demon"],
            (2023, 1, 15),
            true,
        ),
        demo_user(
            "2",
            "Jane Smith",
            "jane@example.com",
            980,
            &["Eco Champion", "Night Rider"],
            (2023, 2, 20),
            false,
        ),
        demo_user(
            "3",
            "Bob Johnson",
            "bob@example.com",
            750,
            &["Safe Driver"],
            (2023, 3, 10),
            false,
        ),
        demo_user(
            "4",
            "Alice Brown",
            "alice@example.com",
            620,
            &["Speed Demon"],
            (2023, 4, 5),
            false,
        ),
        demo_user(
            "5",
            "Charlie Wilson",
            "charlie@example.com",
            480,
            &[],
            (2023, 5, 12),
            false,
        ),
    ]
}
