use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;

use crate::traits::ProgressSink;

/// Vue cohérente de l'avancement à un instant donné.
///
/// `completed` et `total` sont toujours publiés ensemble : un lecteur ne
/// peut jamais observer une paire issue de deux mises à jour différentes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Unités terminées, `<= total`.
    pub completed: u64,
    /// Unités attendues, `>= 1`.
    pub total: u64,
    /// Temps écoulé depuis la création du tracker, au moment de la publication.
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Pourcentage [0.0, 100.0].
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.completed as f64 * 100.0 / self.total as f64
    }

    /// `elapsed × (total − completed) / completed`, `None` tant que rien n'est terminé.
    ///
    /// # Example
    /// ```
    /// use rt_core::progress::ProgressSnapshot;
    /// use std::time::Duration;
    /// let s = ProgressSnapshot { completed: 1, total: 4, elapsed: Duration::from_secs(2) };
    /// assert_eq!(s.eta(), Some(Duration::from_secs(6)));
    /// let s = ProgressSnapshot { completed: 0, ..s };
    /// assert_eq!(s.eta(), None);
    /// ```
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        if self.completed == 0 {
            return None;
        }
        let remaining = self.total.saturating_sub(self.completed);
        let nanos = self.elapsed.as_nanos() * u128::from(remaining) / u128::from(self.completed);
        Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }

    /// `true` une fois toutes les unités terminées.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }

    /// Barre de progression textuelle : `|█████-----| 50%  ETA: 0:00:03`.
    ///
    /// # Example
    /// ```
    /// use rt_core::progress::ProgressSnapshot;
    /// use std::time::Duration;
    /// let s = ProgressSnapshot { completed: 0, total: 4, elapsed: Duration::ZERO };
    /// assert_eq!(s.render_bar(4), "|----| 0%  ETA: calcul...");
    /// ```
    #[must_use]
    pub fn render_bar(&self, width: usize) -> String {
        let filled = (self.completed as usize * width / self.total as usize).min(width);
        let bar: String = "█".repeat(filled) + &"-".repeat(width - filled);
        let eta = self
            .eta()
            .map_or_else(|| "calcul...".to_string(), format_hms);
        format!("|{bar}| {}%  ETA: {eta}", self.percent() as u32)
    }
}

/// `H:MM:SS`, secondes tronquées.
///
/// # Example
/// ```
/// use rt_core::progress::format_hms;
/// use std::time::Duration;
/// assert_eq!(format_hms(Duration::from_secs(3725)), "1:02:05");
/// ```
#[must_use]
pub fn format_hms(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Compteur d'avancement partagé entre les workers d'un export multi-format.
///
/// Les mutations passent par une section critique (`Mutex`) ; chaque mutation
/// publie un [`ProgressSnapshot`] via `ArcSwap`, que les lecteurs consultent
/// sans verrou.
///
/// # Example
/// ```
/// use rt_core::progress::ProgressTracker;
/// let tracker = ProgressTracker::new(4);
/// assert!(tracker.eta().is_none());
/// tracker.advance(2);
/// assert_eq!(tracker.percent(), 50.0);
/// assert!(tracker.eta().is_some());
/// ```
pub struct ProgressTracker {
    total: u64,
    started_at: Instant,
    completed: Mutex<u64>,
    snapshot: ArcSwap<ProgressSnapshot>,
}

impl ProgressTracker {
    /// Crée un tracker pour `total` unités (au moins 1).
    #[must_use]
    pub fn new(total: u64) -> Self {
        let total = total.max(1);
        Self {
            total,
            started_at: Instant::now(),
            completed: Mutex::new(0),
            snapshot: ArcSwap::from_pointee(ProgressSnapshot {
                completed: 0,
                total,
                elapsed: Duration::ZERO,
            }),
        }
    }

    /// Ajoute `n` unités terminées, plafonné à `total`, et retourne le nouvel état.
    pub fn advance(&self, n: u64) -> ProgressSnapshot {
        // A poisoned counter is still a valid integer; keep counting.
        let mut completed = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
        *completed = completed.saturating_add(n).min(self.total);
        let snapshot = ProgressSnapshot {
            completed: *completed,
            total: self.total,
            elapsed: self.started_at.elapsed(),
        };
        // Stored under the lock so snapshots are published in mutation order.
        self.snapshot.store(Arc::new(snapshot));
        snapshot
    }

    /// Dernier état publié (lecture sans verrou, éventuellement un peu en retard).
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        **self.snapshot.load()
    }

    /// Dernier état publié, avec le temps écoulé mis à jour à maintenant.
    #[must_use]
    pub fn current(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            elapsed: self.started_at.elapsed(),
            ..self.snapshot()
        }
    }

    /// Pourcentage [0.0, 100.0] du dernier état publié.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.snapshot().percent()
    }

    /// Estimation du temps restant ; `None` tant que rien n'est terminé.
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        self.current().eta()
    }

    /// Nombre total d'unités attendues.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl ProgressSink for ProgressTracker {
    fn advance(&self, units: u64) {
        ProgressTracker::advance(self, units);
    }
}
