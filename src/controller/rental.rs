//! Renting and returning movies

use rand::Rng;

use crate::model::Screen;
use super::AppController;

/// Cosmetic price range in cents ($2.99 to $9.99)
const PRICE_RANGE_CENTS: std::ops::RangeInclusive<u32> = 299..=999;

pub fn rental_price_cents() -> u32 {
    rand::rng().random_range(PRICE_RANGE_CENTS)
}

impl AppController {
    /// Ask the user to confirm renting the selected movie
    pub async fn request_rental(&self) {
        if self.model.get_ui_state().await.screen != Screen::Browse {
            return;
        }
        let Some(movie) = self.model.get_selected_movie().await else {
            return;
        };
        let price_cents = rental_price_cents();
        tracing::debug!(movie_id = %movie.id, price_cents, "Offering rental");
        self.model.offer_rental(movie, price_cents).await;
    }

    pub async fn confirm_rental(&self) {
        let Some(offer) = self.model.take_rental_offer().await else {
            return;
        };
        let title = offer.movie.title.clone();
        let price = offer.price_label();

        if self.model.rentals().rent(offer.movie) {
            self.model
                .set_info(format!("Rented {} for {}.", title, price))
                .await;
        } else {
            self.model
                .set_info(format!("{} is already rented.", title))
                .await;
        }
    }

    pub async fn cancel_rental(&self) {
        if let Some(offer) = self.model.take_rental_offer().await {
            tracing::debug!(movie_id = %offer.movie.id, "Rental cancelled");
        }
    }

    /// Return the movie selected on the rented screen
    pub async fn return_selected(&self) {
        if self.model.get_ui_state().await.screen != Screen::Rented {
            return;
        }
        let Some(movie) = self.model.get_selected_movie().await else {
            return;
        };
        if self.model.rentals().unrent(&movie.id) {
            self.model.set_info(format!("Returned {}.", movie.title)).await;
        }
    }

    /// Surface failed snapshot writes as error notices
    pub fn watch_persistence(&self) {
        let mut status_rx = self.model.rentals().write_status();
        let model = self.model.clone();

        tokio::spawn(async move {
            while status_rx.changed().await.is_ok() {
                let error = status_rx.borrow_and_update().error.clone();
                if let Some(e) = error {
                    model
                        .set_error(format!("Could not save rentals: {}", e))
                        .await;
                }
                if model.should_quit().await {
                    break;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::harness;
    use crate::model::{MovieId, MovieRecord, NoticeKind};

    fn movie(id: i64, title: &str) -> MovieRecord {
        MovieRecord::new(id, title)
    }

    #[test]
    fn test_price_in_range() {
        for _ in 0..200 {
            let price = rental_price_cents();
            assert!((299..=999).contains(&price));
        }
    }

    #[tokio::test]
    async fn test_confirmed_rental_moves_movie_out_of_browse() {
        let h = harness().await;
        *h.source.popular.lock().unwrap() = vec![movie(1, "A"), movie(2, "B")];
        let controller = AppController::new(h.model.clone());
        controller.load_popular().await;

        controller.request_rental().await;
        assert!(h.model.has_rental_offer().await);
        controller.confirm_rental().await;

        assert!(!h.model.has_rental_offer().await);
        assert!(h.model.rentals().is_rented(&MovieId::Number(1)));
        assert_eq!(h.model.available_movies().await, vec![movie(2, "B")]);
        assert_eq!(h.model.rented_movies().len(), 1);

        h.model.rentals().flush().await.unwrap();
        assert!(h.store.value(crate::model::RENTALS_KEY).is_some());
    }

    #[tokio::test]
    async fn test_cancelled_rental_changes_nothing() {
        let h = harness().await;
        *h.source.popular.lock().unwrap() = vec![movie(1, "A")];
        let controller = AppController::new(h.model.clone());
        controller.load_popular().await;

        controller.request_rental().await;
        controller.cancel_rental().await;
        assert!(!h.model.has_rental_offer().await);
        assert!(h.model.rentals().is_empty());
    }

    #[tokio::test]
    async fn test_return_from_rented_screen() {
        let h = harness().await;
        *h.source.popular.lock().unwrap() = vec![movie(1, "A")];
        let controller = AppController::new(h.model.clone());
        controller.load_popular().await;
        h.model.rentals().rent(movie(1, "A"));

        // Returning only works on the rented screen
        controller.return_selected().await;
        assert!(h.model.rentals().is_rented(&MovieId::Number(1)));

        h.model.toggle_screen().await;
        controller.return_selected().await;
        assert!(h.model.rentals().is_empty());
        assert_eq!(h.model.available_movies().await, vec![movie(1, "A")]);
    }

    #[tokio::test]
    async fn test_write_failure_becomes_error_notice() {
        let h = harness().await;
        let controller = AppController::new(h.model.clone());
        controller.watch_persistence();

        h.store.set_fail_writes(true);
        h.model.rentals().rent(movie(1, "A"));
        assert!(h.model.rentals().flush().await.is_err());

        for _ in 0..100 {
            if h.model.has_notice().await {
                break;
            }
            tokio::task::yield_now().await;
        }
        let notice = h.model.get_ui_state().await.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(h.model.rentals().is_rented(&MovieId::Number(1)));
    }
}
