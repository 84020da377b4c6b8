//! Sample reviews shown when no source yields anything.
//!
//! The set is fixed and deterministic so the carousel always has content and
//! the UI can label it ("showing example reviews") via the `fallback` flag on
//! [`crate::MergedReviews`]. Entries are ordered newest first, all marked as
//! external and verified.

use chrono::{DateTime, NaiveDate, Utc};
use maikekai_core::{Review, ReviewSource};

use crate::normalize::{country_from_language, derive_title};

struct Sample {
    id: &'static str,
    author: &'static str,
    language: &'static str,
    date: (i32, u32, u32),
    rating: u8,
    text: &'static str,
}

const SAMPLES: &[Sample] = &[
    Sample {
        id: "sample-1",
        author: "Sarah Johnson",
        language: "en",
        date: (2024, 1, 15),
        rating: 5,
        text: "Absolutely incredible experience! The instructors were professional and patient. \
               I went from never surfing to catching my first wave in just 3 days. The \
               accommodation was perfect and the food was delicious. Highly recommend!",
    },
    Sample {
        id: "sample-2",
        author: "Mike Rodriguez",
        language: "en",
        date: (2024, 1, 10),
        rating: 5,
        text: "Best surf vacation ever! The waves were perfect, the instructors knew exactly \
               where to take us each day based on conditions. Will definitely be back!",
    },
    Sample {
        id: "sample-3",
        author: "Emma Thompson",
        language: "en",
        date: (2024, 1, 8),
        rating: 5,
        text: "As a beginner, I was nervous about learning to surf, but the team made me feel \
               so comfortable. The small group size meant I got lots of personal attention.",
    },
    Sample {
        id: "sample-4",
        author: "David Chen",
        language: "en",
        date: (2024, 1, 5),
        rating: 5,
        text: "Professional operation from start to finish. The equipment was top quality and \
               the safety briefing was thorough. Perfect for intermediate surfers!",
    },
    Sample {
        id: "sample-5",
        author: "Lisa Martinez",
        language: "en",
        date: (2024, 1, 3),
        rating: 5,
        text: "The advanced package was exactly what I was looking for. Video analysis and \
               coaching on technique really helped me improve my surfing.",
    },
    Sample {
        id: "sample-6",
        author: "Tom Wilson",
        language: "en",
        date: (2024, 1, 1),
        rating: 4,
        text: "Great value for money! Accommodation, meals, transport, and equipment were all \
               included. The location is perfect for surfing year-round.",
    },
    Sample {
        id: "sample-7",
        author: "Anna Kowalski",
        language: "pl",
        date: (2023, 12, 28),
        rating: 5,
        text: "I came alone and felt so welcome! The other guests were friendly and the rooms \
               were clean and comfortable.",
    },
    Sample {
        id: "sample-8",
        author: "Carlos Silva",
        language: "es",
        date: (2023, 12, 25),
        rating: 5,
        text: "Perfecto! Los instructores hablan español e inglés. Las olas estaban increíbles \
               y el hotel está en una ubicación perfecta.",
    },
    Sample {
        id: "sample-9",
        author: "Jennifer Park",
        language: "ko",
        date: (2023, 12, 22),
        rating: 5,
        text: "The photography service was amazing! I got beautiful shots of me surfing that I \
               can treasure forever.",
    },
    Sample {
        id: "sample-10",
        author: "Robert Taylor",
        language: "en",
        date: (2023, 12, 20),
        rating: 5,
        text: "Excellent surf conditions and professional instruction. Highly recommend for all \
               skill levels!",
    },
];

/// The documented sample set, newest first.
#[must_use]
pub fn sample_reviews() -> Vec<Review> {
    SAMPLES.iter().filter_map(to_review).collect()
}

fn to_review(sample: &Sample) -> Option<Review> {
    let (year, month, day) = sample.date;
    let created_at: DateTime<Utc> = NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(12, 0, 0)?
        .and_utc();

    Some(Review {
        id: sample.id.to_string(),
        source: ReviewSource::External,
        author_name: sample.author.to_string(),
        author_country: Some(country_from_language(sample.language).to_string()),
        avatar_initial: sample.author.chars().next().unwrap_or('A'),
        profile_photo_url: None,
        rating: sample.rating,
        title: derive_title(sample.text),
        body_text: sample.text.to_string(),
        created_at,
        verified: true,
        is_public: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sample_converts() {
        assert_eq!(sample_reviews().len(), SAMPLES.len());
    }

    #[test]
    fn samples_are_ordered_newest_first() {
        let samples = sample_reviews();
        assert!(samples
            .windows(2)
            .all(|pair| pair[0].created_at > pair[1].created_at));
    }

    #[test]
    fn sample_ids_are_unique_and_ratings_valid() {
        let samples = sample_reviews();
        let mut ids: Vec<&str> = samples.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), samples.len());
        assert!(samples.iter().all(|r| (1..=5).contains(&r.rating)));
    }
}
