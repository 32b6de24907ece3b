use std::time::{Duration, Instant};

use thiserror::Error;

use crate::common::types::UserId;
use crate::track::Track;

/// Split the playlist into pages under a fixed character budget, marking
/// the current track's line.
pub fn build_pages(playlist: &[Track], cursor: isize, page_chars: usize) -> Vec<String> {
    let mut pages = Vec::new();
    let mut current_page = String::new();

    for (i, track) in playlist.iter().enumerate() {
        let prefix = if i as isize == cursor {
            "(playing)".to_string()
        } else {
            format!("#{}", i + 1)
        };
        let line = format!("{prefix} {}\n", track.title);
        if !current_page.is_empty() && current_page.len() + line.len() > page_chars {
            pages.push(std::mem::take(&mut current_page));
        }
        current_page.push_str(&line);
    }
    if !current_page.is_empty() {
        pages.push(current_page);
    }
    pages
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Prev,
    Next,
    Close,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    /// The view sat idle past its deadline; interactions are rejected.
    #[error("this queue view has expired")]
    Expired,

    /// Pagination is scoped to the user who requested the view.
    #[error("only the requester can turn these pages")]
    NotOwner,
}

/// One rendered page plus navigation affordances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuePage {
    pub body: String,
    pub page: usize,
    pub page_count: usize,
    pub total_tracks: usize,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

/// Paginated, owner-scoped queue listing with an idle deadline.
#[derive(Debug)]
pub struct QueuePaginator {
    pages: Vec<String>,
    total_tracks: usize,
    owner: UserId,
    page: usize,
    deadline: Instant,
}

impl QueuePaginator {
    pub fn new(pages: Vec<String>, total_tracks: usize, owner: UserId, ttl: Duration) -> Self {
        Self {
            pages,
            total_tracks,
            owner,
            page: 0,
            deadline: Instant::now() + ttl,
        }
    }

    pub fn render(&self) -> QueuePage {
        QueuePage {
            body: self.pages.get(self.page).cloned().unwrap_or_default(),
            page: self.page + 1,
            page_count: self.pages.len(),
            total_tracks: self.total_tracks,
            prev_disabled: self.page == 0,
            next_disabled: self.page + 1 >= self.pages.len(),
        }
    }

    /// Apply a pagination action. `Ok(None)` means the view was closed.
    pub fn handle(
        &mut self,
        user: UserId,
        action: PageAction,
        now: Instant,
    ) -> Result<Option<QueuePage>, ViewError> {
        if now > self.deadline {
            return Err(ViewError::Expired);
        }
        if user != self.owner {
            return Err(ViewError::NotOwner);
        }

        match action {
            PageAction::Prev => {
                if self.page > 0 {
                    self.page -= 1;
                }
            }
            PageAction::Next => {
                if self.page + 1 < self.pages.len() {
                    self.page += 1;
                }
            }
            PageAction::Close => return Ok(None),
        }
        Ok(Some(self.render()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackRef;

    fn tracks(n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| {
                Track::new(
                    format!("Track number {i:03}"),
                    TrackRef::Query(format!("q{i}")),
                    1.into(),
                )
            })
            .collect()
    }

    #[test]
    fn pages_stay_under_budget_and_mark_current() {
        let playlist = tracks(40);
        let pages = build_pages(&playlist, 3, 128);

        assert!(pages.len() > 1);
        assert!(pages.iter().all(|p| p.len() <= 128));
        assert!(pages[0].contains("(playing) Track number 003"));
        assert!(!pages.concat().contains("#4 Track number 003"));
        // Every track appears exactly once.
        assert_eq!(pages.concat().lines().count(), 40);
    }

    #[test]
    fn empty_playlist_yields_no_pages() {
        assert!(build_pages(&[], -1, 1024).is_empty());
    }

    #[test]
    fn oversized_single_line_still_gets_a_page() {
        let playlist = vec![Track::new(
            "x".repeat(300),
            TrackRef::Query("q".into()),
            1.into(),
        )];
        let pages = build_pages(&playlist, -1, 128);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn navigation_clamps_at_edges() {
        let owner = UserId(9);
        let mut view = QueuePaginator::new(
            vec!["one".into(), "two".into()],
            2,
            owner,
            Duration::from_secs(180),
        );
        let now = Instant::now();

        let first = view.render();
        assert!(first.prev_disabled);
        assert!(!first.next_disabled);

        let page = view.handle(owner, PageAction::Next, now).unwrap().unwrap();
        assert_eq!(page.page, 2);
        assert!(page.next_disabled);

        // Next at the last page stays put.
        let page = view.handle(owner, PageAction::Next, now).unwrap().unwrap();
        assert_eq!(page.page, 2);
    }

    #[test]
    fn foreign_user_is_rejected() {
        let mut view = QueuePaginator::new(vec!["one".into()], 1, UserId(9), Duration::from_secs(180));
        assert_eq!(
            view.handle(UserId(10), PageAction::Next, Instant::now()),
            Err(ViewError::NotOwner)
        );
    }

    #[test]
    fn expired_view_rejects_interaction() {
        let mut view = QueuePaginator::new(vec!["one".into()], 1, UserId(9), Duration::from_secs(0));
        let later = Instant::now() + Duration::from_secs(1);
        assert_eq!(
            view.handle(UserId(9), PageAction::Next, later),
            Err(ViewError::Expired)
        );
    }

    #[test]
    fn close_consumes_the_view() {
        let mut view = QueuePaginator::new(vec!["one".into()], 1, UserId(9), Duration::from_secs(180));
        assert_eq!(
            view.handle(UserId(9), PageAction::Close, Instant::now()),
            Ok(None)
        );
    }
}
