//! Recommendation filter.
//!
//! Deterministic narrowing of search results to at most three records,
//! using preferred genres as a soft filter. Ties are broken purely by
//! original result order; there is no secondary sort key.

use crate::state::BookRecord;

/// Maximum number of recommendations.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Select up to three recommendations from `results`.
///
/// Records whose genre case-insensitively contains any preferred-genre
/// substring come first, in original order. With no genre matches the top
/// results are taken as-is; with one or two matches the remaining slots are
/// filled with the earliest non-duplicate results.
pub fn select_recommendations(
    preferred_genres: &[String],
    results: &[BookRecord],
) -> Vec<BookRecord> {
    let genre_matched: Vec<&BookRecord> = if preferred_genres.is_empty() {
        results.iter().collect()
    } else {
        results
            .iter()
            .filter(|book| {
                book.genre.as_deref().is_some_and(|genre| {
                    let genre = genre.to_lowercase();
                    preferred_genres
                        .iter()
                        .any(|pref| genre.contains(&pref.to_lowercase()))
                })
            })
            .collect()
    };

    let mut recommendations: Vec<BookRecord> = genre_matched
        .iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|b| (*b).clone())
        .collect();

    if recommendations.is_empty() {
        // No genre matched anything; fall back to the top results overall
        return results.iter().take(MAX_RECOMMENDATIONS).cloned().collect();
    }

    if recommendations.len() < MAX_RECOMMENDATIONS {
        let selected: Vec<i64> = recommendations.iter().map(|b| b.id).collect();
        for book in results {
            if recommendations.len() >= MAX_RECOMMENDATIONS {
                break;
            }
            if !selected.contains(&book.id) {
                recommendations.push(book.clone());
            }
        }
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn book(id: i64, genre: &str) -> BookRecord {
        BookRecord {
            id,
            title: format!("Libro {id}"),
            author: "Autor".to_string(),
            genre: Some(genre.to_string()),
            average_rating: None,
        }
    }

    #[test]
    fn test_genre_matches_come_first_then_fill() {
        // 5 results, 2 matching "fantasy": those 2 plus 1 filler = 3 total
        let results = vec![
            book(1, "Ciencia Ficción"),
            book(2, "Fantasía Épica"),
            book(3, "Terror"),
            book(4, "Fantasía"),
            book(5, "Drama"),
        ];
        let genres = vec!["fantasía".to_string()];

        let recs = select_recommendations(&genres, &results);
        let ids: Vec<i64> = recs.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 4, 1]);
    }

    #[test]
    fn test_no_genre_match_falls_back_to_top_results() {
        let results = vec![book(1, "Terror"), book(2, "Drama"), book(3, "Poesía"), book(4, "Ensayo")];
        let genres = vec!["fantasía".to_string()];

        let recs = select_recommendations(&genres, &results);
        let ids: Vec<i64> = recs.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_preferred_genres_takes_top_results() {
        let results = vec![book(1, "A"), book(2, "B"), book(3, "C"), book(4, "D")];
        let recs = select_recommendations(&[], &results);
        let ids: Vec<i64> = recs.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_genre_match_is_case_insensitive_substring() {
        let results = vec![book(1, "ciencia ficción dura")];
        let genres = vec!["Ciencia Ficción".to_string()];

        let recs = select_recommendations(&genres, &results);
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn test_missing_genre_field_never_matches() {
        let mut no_genre = book(1, "");
        no_genre.genre = None;
        let results = vec![no_genre, book(2, "Fantasía")];
        let genres = vec!["fantasía".to_string()];

        let recs = select_recommendations(&genres, &results);
        assert_eq!(recs[0].id, 2);
    }

    #[test]
    fn test_fewer_results_than_slots() {
        let results = vec![book(1, "Fantasía")];
        let recs = select_recommendations(&["fantasía".to_string()], &results);
        assert_eq!(recs.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_at_most_three_and_deterministic(
            ids in proptest::collection::vec(1i64..100, 0..12),
            genres in proptest::collection::vec("[a-z]{1,6}", 0..4),
        ) {
            let results: Vec<BookRecord> = ids
                .iter()
                .enumerate()
                .map(|(i, id)| book(*id, if i % 2 == 0 { "fantasía" } else { "terror" }))
                .collect();

            let first = select_recommendations(&genres, &results);
            let second = select_recommendations(&genres, &results);

            prop_assert!(first.len() <= MAX_RECOMMENDATIONS);
            prop_assert_eq!(&first, &second);
            // Every recommendation comes from the input
            for rec in &first {
                prop_assert!(results.iter().any(|r| r.id == rec.id));
            }
        }
    }
}
