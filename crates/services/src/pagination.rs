//! Pagination-bar window math for the list views.

/// How many page numbers the bar shows at most.
pub const BAR_LENGTH: usize = 5;

/// Computes the window of page numbers to display, centered on the
/// current page and clipped to `[0, total_pages)`.
///
/// A current page beyond the last page produces an empty window rather
/// than panicking.
pub fn bar_numbers(current_page: usize, total_pages: usize) -> Vec<usize> {
    let start = current_page.saturating_sub(BAR_LENGTH / 2);
    let end = total_pages.min(start.saturating_add(BAR_LENGTH));
    (start..end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_of_one_is_a_single_entry() {
        assert_eq!(bar_numbers(0, 1), vec![0]);
    }

    #[test]
    fn window_is_left_clipped_near_the_start() {
        assert_eq!(bar_numbers(0, 10), vec![0, 1, 2, 3, 4]);
        assert_eq!(bar_numbers(1, 10), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn window_is_centered_in_the_middle() {
        assert_eq!(bar_numbers(5, 10), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn window_is_right_clipped_near_the_end() {
        assert_eq!(bar_numbers(9, 10), vec![7, 8, 9]);
    }

    #[test]
    fn out_of_range_page_yields_an_empty_window() {
        assert_eq!(bar_numbers(10, 3), Vec::<usize>::new());
        assert_eq!(bar_numbers(usize::MAX, 3), Vec::<usize>::new());
    }

    #[test]
    fn no_pages_yields_an_empty_window() {
        assert_eq!(bar_numbers(0, 0), Vec::<usize>::new());
    }
}
