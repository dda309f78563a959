//! Tally projection.
//!
//! [`project`] turns a stored [`Poll`] into the [`PollView`] that clients
//! see. It is a pure function and is called on every read that feeds an
//! HTTP response or a broadcast, so a tally is never stale.
//!
//! Percentages are rounded half-up independently per option. They are not
//! adjusted to sum to 100.

use classpoll_types::{OptionTally, PollView};

use crate::poll::Poll;

/// Project a poll into its client-facing view with live counts.
pub fn project(poll: &Poll) -> PollView {
    let counts = poll.option_counts();
    let total = poll.responses().len();

    let options = poll
        .options()
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(index, (option, count))| OptionTally {
            id: index.to_string(),
            text: option.text.clone(),
            count,
            percentage: percentage(count, total),
            is_correct: option.is_correct,
        })
        .collect();

    PollView {
        id: poll.id(),
        question: poll.question().to_owned(),
        options,
        responses: poll.responses().clone(),
        total_responses: total,
        start_time: poll.start_time(),
        end_time: poll.end_time(),
    }
}

/// `count / total` as a whole percentage, rounded half-up. Zero when
/// nobody has voted.
pub fn percentage(count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let count = count.min(total) as u128;
    let total = total as u128;
    // floor((200 * count + total) / (2 * total)) == round_half_up(100 * count / total)
    let rounded = count
        .saturating_mul(200)
        .saturating_add(total)
        .checked_div(total.saturating_mul(2))
        .unwrap_or(0);
    u8::try_from(rounded).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::NewOption;

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 200), 1); // 0.5
        assert_eq!(percentage(1, 201), 0);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn independent_rounding_may_exceed_100() {
        // 1/8 = 12.5 rounds to 13 for each of 8 options.
        let sum: u32 = (0..8).map(|_| u32::from(percentage(1, 8))).sum();
        assert_eq!(sum, 104);
    }

    #[test]
    fn project_capital_of_france() {
        let mut poll = Poll::new(
            "Capital of France?",
            &[NewOption::correct("Paris"), NewOption::new("London")],
            0,
            30_000,
        );
        poll.record("ana", 0);
        poll.record("ben", 0);
        poll.record("cy", 1);

        let view = project(&poll);
        assert_eq!(view.total_responses, 3);

        let paris = view.option("Paris");
        assert_eq!(paris.map(|o| (o.count, o.percentage)), Some((2, 67)));
        assert_eq!(paris.map(|o| o.id.as_str()), Some("0"));
        assert_eq!(paris.map(|o| o.is_correct), Some(true));

        let london = view.option("London");
        assert_eq!(london.map(|o| (o.count, o.percentage)), Some((1, 33)));
    }

    #[test]
    fn empty_poll_projects_zeroes() {
        let poll = Poll::new("Q", &[NewOption::new("a"), NewOption::new("b")], 0, 1);
        let view = project(&poll);
        assert_eq!(view.total_responses, 0);
        assert!(view.options.iter().all(|o| o.count == 0 && o.percentage == 0));
    }
}
