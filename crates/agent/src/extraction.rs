use std::collections::BTreeMap;

use chrono::NaiveDate;
use uuid::Uuid;

use airdesk_core::domain::conversation::{BookingAction, BookingField};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookingRequest {
    pub action: Option<BookingAction>,
    pub fields: BTreeMap<BookingField, String>,
}

impl BookingRequest {
    pub fn is_empty(&self) -> bool {
        self.action.is_none() && self.fields.is_empty()
    }
}

/// Longest labels first so `new seat:` wins over `seat:` and `airline name:` over `name:`.
const LABELS: &[(&str, BookingField)] = &[
    ("new seat number", BookingField::NewSeatNumber),
    ("new seat", BookingField::NewSeatNumber),
    ("seat number", BookingField::SeatNumber),
    ("seat", BookingField::SeatNumber),
    ("airline name", BookingField::AirlineName),
    ("airline", BookingField::AirlineName),
    ("ticket number", BookingField::TicketNumber),
    ("ticket", BookingField::TicketNumber),
    ("name", BookingField::Name),
    ("date", BookingField::Date),
    ("origin", BookingField::Origin),
    ("from", BookingField::Origin),
    ("destination", BookingField::Destination),
    ("to", BookingField::Destination),
];

const PHRASE_STOP_WORDS: &[&str] = &["on", "for", "at", "in", "with", "seat", "and"];

/// Deterministic extraction of booking actions and fields from a customer message.
#[derive(Clone, Debug, Default)]
pub struct BookingRequestExtractor;

impl BookingRequestExtractor {
    pub fn new() -> Self {
        Self
    }

    /// `pending` is the action of a draft already in progress; it decides whether a bare
    /// seat token is the booked seat or the new seat.
    pub fn extract(&self, text: &str, pending: Option<BookingAction>) -> BookingRequest {
        let action = detect_action(text);
        let effective = action.or(pending);

        let mut fields = extract_labelled(text);
        if effective == Some(BookingAction::UpdateSeat) {
            if let Some(seat) = fields.remove(&BookingField::SeatNumber) {
                fields.entry(BookingField::NewSeatNumber).or_insert(seat);
            }
        }

        if !fields.contains_key(&BookingField::Origin)
            && !fields.contains_key(&BookingField::Destination)
        {
            if let Some((origin, destination)) = extract_route(text) {
                fields.insert(BookingField::Origin, origin);
                fields.insert(BookingField::Destination, destination);
            }
        }

        for token in text.split_whitespace().map(strip_punctuation) {
            if Uuid::parse_str(token).is_ok() {
                fields.entry(BookingField::TicketNumber).or_insert_with(|| token.to_string());
            } else if NaiveDate::parse_from_str(token, "%Y-%m-%d").is_ok() {
                fields.entry(BookingField::Date).or_insert_with(|| token.to_string());
            } else if is_seat_token(token) {
                let field = if effective == Some(BookingAction::UpdateSeat) {
                    BookingField::NewSeatNumber
                } else {
                    BookingField::SeatNumber
                };
                fields.entry(field).or_insert_with(|| token.to_ascii_uppercase());
            }
        }

        fields.retain(|_, value| !value.is_empty());
        BookingRequest { action, fields }
    }
}

fn strip_punctuation(token: &str) -> &str {
    token.trim_matches(|c: char| matches!(c, ',' | '.' | ';' | '!' | '?' | '(' | ')' | '"' | '\''))
}

fn detect_action(text: &str) -> Option<BookingAction> {
    let lowered = text.to_ascii_lowercase();
    let words = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>();
    let has = |candidates: &[&str]| words.iter().any(|word| candidates.contains(word));

    if has(&["cancel", "cancellation"]) {
        Some(BookingAction::Cancel)
    } else if has(&["update", "change", "modify", "move"]) {
        Some(BookingAction::UpdateSeat)
    } else if has(&["show", "list", "view", "display"])
        || lowered.contains("my bookings")
        || lowered.contains("booked seats")
    {
        Some(BookingAction::ShowBookings)
    } else if has(&["book", "reserve"]) {
        Some(BookingAction::Book)
    } else {
        None
    }
}

fn extract_labelled(text: &str) -> BTreeMap<BookingField, String> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    let mut found: Vec<(usize, usize, BookingField)> = Vec::new();

    for (colon, _) in lowered.match_indices(':') {
        let head = lowered[..colon].trim_end();
        for (label, field) in LABELS {
            if !head.ends_with(label) {
                continue;
            }
            let start = head.len() - label.len();
            let at_boundary = head[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_ascii_alphanumeric());
            if at_boundary {
                found.push((start, colon + 1, *field));
                break;
            }
        }
    }

    let mut fields = BTreeMap::new();
    for (index, (_, value_start, field)) in found.iter().enumerate() {
        let value_end = found.get(index + 1).map_or(text.len(), |(next_start, _, _)| *next_start);
        let value = text[*value_start..value_end]
            .trim()
            .trim_end_matches(|c: char| matches!(c, ',' | ';' | '.'))
            .trim();
        if !value.is_empty() {
            fields.insert(*field, value.to_string());
        }
    }
    fields
}

/// `from X to Y`, where `Y` stops at punctuation or a preposition.
fn extract_route(text: &str) -> Option<(String, String)> {
    let words = text.split_whitespace().collect::<Vec<_>>();
    let from = words.iter().position(|word| word.eq_ignore_ascii_case("from"))?;
    let to = from + 1 + words[from + 1..].iter().position(|word| word.eq_ignore_ascii_case("to"))?;

    let origin = words[from + 1..to].iter().map(|word| strip_punctuation(word)).collect::<Vec<_>>();

    let mut destination = Vec::new();
    for word in &words[to + 1..] {
        if PHRASE_STOP_WORDS.contains(&word.to_ascii_lowercase().as_str()) {
            break;
        }
        destination.push(strip_punctuation(word));
        if word.ends_with([',', '.', ';', '!', '?']) {
            break;
        }
    }

    let origin = origin.join(" ");
    let destination = destination.join(" ");
    if origin.is_empty() || destination.is_empty() {
        None
    } else {
        Some((origin, destination))
    }
}

/// Row digits followed by a single seat letter, e.g. `7C` or `12A`.
fn is_seat_token(token: &str) -> bool {
    let Some(letter) = token.chars().last() else {
        return false;
    };
    let row = &token[..token.len() - letter.len_utf8()];
    letter.is_ascii_alphabetic()
        && (1..=3).contains(&row.len())
        && row.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use airdesk_core::domain::conversation::{BookingAction, BookingField};

    use super::BookingRequestExtractor;

    #[test]
    fn extracts_labelled_booking_request() {
        let request = BookingRequestExtractor::new().extract(
            "Book a seat. name: Sara Malik, airline: Emirates, seat: 14C, date: 2026-12-20, \
             from: Karachi, to: Dubai",
            None,
        );

        assert_eq!(request.action, Some(BookingAction::Book));
        assert_eq!(request.fields.get(&BookingField::Name).map(String::as_str), Some("Sara Malik"));
        assert_eq!(
            request.fields.get(&BookingField::AirlineName).map(String::as_str),
            Some("Emirates")
        );
        assert_eq!(request.fields.get(&BookingField::SeatNumber).map(String::as_str), Some("14C"));
        assert_eq!(request.fields.get(&BookingField::Date).map(String::as_str), Some("2026-12-20"));
        assert_eq!(request.fields.get(&BookingField::Origin).map(String::as_str), Some("Karachi"));
        assert_eq!(
            request.fields.get(&BookingField::Destination).map(String::as_str),
            Some("Dubai")
        );
    }

    #[test]
    fn labels_without_separators_still_split() {
        let request = BookingRequestExtractor::new()
            .extract("airline name: Air Sial origin: Sialkot destination: Riyadh", None);

        assert_eq!(
            request.fields.get(&BookingField::AirlineName).map(String::as_str),
            Some("Air Sial")
        );
        assert_eq!(request.fields.get(&BookingField::Origin).map(String::as_str), Some("Sialkot"));
        assert_eq!(
            request.fields.get(&BookingField::Destination).map(String::as_str),
            Some("Riyadh")
        );
        assert!(!request.fields.contains_key(&BookingField::Name));
    }

    #[test]
    fn route_phrase_and_bare_tokens_fill_fields() {
        let request = BookingRequestExtractor::new()
            .extract("I'd like to book seat 3a from New York to Lahore on 2026-11-11", None);

        assert_eq!(request.action, Some(BookingAction::Book));
        assert_eq!(request.fields.get(&BookingField::SeatNumber).map(String::as_str), Some("3A"));
        assert_eq!(request.fields.get(&BookingField::Origin).map(String::as_str), Some("New York"));
        assert_eq!(
            request.fields.get(&BookingField::Destination).map(String::as_str),
            Some("Lahore")
        );
        assert_eq!(request.fields.get(&BookingField::Date).map(String::as_str), Some("2026-11-11"));
    }

    #[test]
    fn cancel_picks_up_uuid_ticket() {
        let request = BookingRequestExtractor::new()
            .extract("Please cancel 7f1f7d4e-2d7c-4a53-9c43-2c1f3b8a9e10.", None);

        assert_eq!(request.action, Some(BookingAction::Cancel));
        assert_eq!(
            request.fields.get(&BookingField::TicketNumber).map(String::as_str),
            Some("7f1f7d4e-2d7c-4a53-9c43-2c1f3b8a9e10")
        );
    }

    #[test]
    fn seat_tokens_become_new_seat_when_updating() {
        let extractor = BookingRequestExtractor::new();

        let request = extractor.extract("change my seat to 22F", None);
        assert_eq!(request.action, Some(BookingAction::UpdateSeat));
        assert_eq!(
            request.fields.get(&BookingField::NewSeatNumber).map(String::as_str),
            Some("22F")
        );

        let follow_up = extractor.extract("seat: 5B", Some(BookingAction::UpdateSeat));
        assert_eq!(follow_up.action, None);
        assert_eq!(
            follow_up.fields.get(&BookingField::NewSeatNumber).map(String::as_str),
            Some("5B")
        );
        assert!(!follow_up.fields.contains_key(&BookingField::SeatNumber));
    }

    #[test]
    fn show_requests_and_small_talk() {
        let extractor = BookingRequestExtractor::new();

        assert_eq!(
            extractor.extract("show my booked seats", None).action,
            Some(BookingAction::ShowBookings)
        );
        assert!(extractor.extract("thanks a lot", None).is_empty());
        assert!(extractor.extract("what time is it? 10:30", None).is_empty());
    }
}
