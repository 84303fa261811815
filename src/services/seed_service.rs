// src/services/seed_service.rs
//
// Curated sample catalog plus starter lists.
// Safe to run repeatedly: existing records are left alone and list
// membership is a set union.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::{validate_media, ListKind, Media, MediaKind};
use crate::error::{AppError, AppResult};
use crate::repositories::MediaRepository;
use crate::services::ListService;
use crate::session::SessionProvider;
use crate::state::RequestOutcome;

struct SeedRecord {
    id: &'static str,
    title: &'static str,
    year: i32,
    description: &'static str,
    kind: MediaKind,
    genres: &'static [&'static str],
    episodes: Option<u32>,
    status: &'static str,
    rating: f64,
}

const SAMPLE_CATALOG: &[SeedRecord] = &[
    SeedRecord {
        id: "spirited-away",
        title: "Spirited Away",
        year: 2001,
        description: "A young girl enters a world ruled by gods and witches where humans are changed into beasts.",
        kind: MediaKind::Anime,
        genres: &["Fantasy", "Adventure", "Family"],
        episodes: Some(1),
        status: "Completed",
        rating: 9.3,
    },
    SeedRecord {
        id: "demon-slayer",
        title: "Demon Slayer: Kimetsu no Yaiba",
        year: 2019,
        description: "Tanjiro sets out to turn his sister back into a human and to find the demon who killed his family.",
        kind: MediaKind::Anime,
        genres: &["Action", "Supernatural", "Historical"],
        episodes: Some(44),
        status: "Ongoing",
        rating: 8.7,
    },
    SeedRecord {
        id: "your-name",
        title: "Your Name",
        year: 2016,
        description: "Two teenagers discover they are swapping bodies and share a connection across time.",
        kind: MediaKind::Anime,
        genres: &["Romance", "Drama", "Supernatural"],
        episodes: Some(1),
        status: "Completed",
        rating: 8.4,
    },
    SeedRecord {
        id: "haikyuu",
        title: "Haikyu!!",
        year: 2014,
        description: "A high school volleyball team fights its way to nationals.",
        kind: MediaKind::Anime,
        genres: &["Sports", "Comedy", "Drama"],
        episodes: Some(85),
        status: "Completed",
        rating: 8.8,
    },
    SeedRecord {
        id: "serial-experiments-lain",
        title: "Serial Experiments Lain",
        year: 1998,
        description: "A quiet student receives an email from a classmate who has died, and follows it into the Wired.",
        kind: MediaKind::Anime,
        genres: &["Mystery", "Psychological", "Sci-Fi"],
        episodes: Some(13),
        status: "Completed",
        rating: 8.1,
    },
    SeedRecord {
        id: "mushishi",
        title: "Mushishi",
        year: 2005,
        description: "A wanderer investigates strange phenomena in a world between dreams and reality.",
        kind: MediaKind::Anime,
        genres: &["Mystery", "Supernatural", "Historical"],
        episodes: Some(46),
        status: "Completed",
        rating: 9.0,
    },
    SeedRecord {
        id: "monster-manga",
        title: "Monster",
        year: 1994,
        description: "A surgeon's choice to save a child's life leads to a decades-long hunt for the truth.",
        kind: MediaKind::Manga,
        genres: &["Psychological", "Thriller", "Drama"],
        episodes: None,
        status: "Completed",
        rating: 9.1,
    },
    SeedRecord {
        id: "berserk-manga",
        title: "Berserk",
        year: 1989,
        description: "A dark medieval fantasy following Guts, a lone mercenary.",
        kind: MediaKind::Manga,
        genres: &["Dark Fantasy", "Action", "Drama"],
        episodes: None,
        status: "Ongoing",
        rating: 9.4,
    },
    SeedRecord {
        id: "tower-of-god",
        title: "Tower of God",
        year: 2010,
        description: "A boy enters a mysterious tower to chase the most important person in his life.",
        kind: MediaKind::Manhwa,
        genres: &["Action", "Adventure", "Mystery"],
        episodes: Some(588),
        status: "Ongoing",
        rating: 8.3,
    },
];

struct StarterList {
    kind: ListKind,
    name: &'static str,
    members: &'static [&'static str],
}

const STARTER_LISTS: &[StarterList] = &[
    StarterList {
        kind: ListKind::Watching,
        name: "Currently Watching",
        members: &["demon-slayer", "tower-of-god"],
    },
    StarterList {
        kind: ListKind::Completed,
        name: "Completed",
        members: &[
            "spirited-away",
            "your-name",
            "haikyuu",
            "serial-experiments-lain",
            "monster-manga",
        ],
    },
    StarterList {
        kind: ListKind::Planned,
        name: "Plan to Watch",
        members: &["mushishi", "berserk-manga"],
    },
];

impl SeedRecord {
    fn to_media(&self) -> Media {
        Media {
            id: self.id.to_string(),
            title: self.title.to_string(),
            year: self.year,
            description: self.description.to_string(),
            image_url: None,
            kind: self.kind,
            genres: self.genres.iter().map(|g| g.to_string()).collect(),
            episode_count: self.episodes,
            rating: Some(self.rating),
            status: self.status.to_string(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeedReport {
    pub media_written: usize,
    pub media_skipped: usize,
    pub list_memberships: usize,
}

pub struct SeedService {
    media_repo: Arc<MediaRepository>,
    lists: Arc<ListService>,
    session: Arc<dyn SessionProvider>,
}

impl SeedService {
    pub fn new(
        media_repo: Arc<MediaRepository>,
        lists: Arc<ListService>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            media_repo,
            lists,
            session,
        }
    }

    pub fn sample_size() -> usize {
        SAMPLE_CATALOG.len()
    }

    /// Writes missing sample records, then the starter lists for the
    /// signed-in user (skipped without a session)
    pub async fn seed_sample_data(&self) -> AppResult<SeedReport> {
        let mut report = SeedReport::default();

        for record in SAMPLE_CATALOG {
            if self.media_repo.exists(record.id).await? {
                report.media_skipped += 1;
                continue;
            }
            let media = record.to_media();
            validate_media(&media)?;
            self.media_repo.save(&media).await?;
            report.media_written += 1;
        }
        log::info!(
            "Seeded catalog: {} written, {} already present",
            report.media_written,
            report.media_skipped
        );

        if self.session.current_user_id().is_none() {
            log::warn!("No session, skipping starter lists");
            return Ok(report);
        }

        for list in STARTER_LISTS {
            for media_id in list.members {
                match self.lists.add_to_list(media_id, list.kind, Some(list.name)).await {
                    RequestOutcome::Failed => {
                        return Err(AppError::Other(format!(
                            "Failed to seed list '{}'",
                            list.name
                        )))
                    }
                    // superseded: the write landed, only its refresh lost the race
                    RequestOutcome::Applied(_) | RequestOutcome::Superseded => {
                        report.list_memberships += 1;
                    }
                }
            }
        }
        log::info!("Seeded {} list memberships", report.list_memberships);

        Ok(report)
    }
}
