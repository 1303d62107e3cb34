//! Token-order-insensitive string similarity.

/// Lowercases, replaces punctuation with spaces and sorts the tokens.
#[must_use]
pub fn sorted_tokens(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Similarity of two strings in 0..=100 after token sorting.
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Edit-based similarity in 0..=100: twice the longest common subsequence
/// over the combined length.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn ratio(a: &str, b: &str) -> u8 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 100;
    }
    let common = longest_common_subsequence(&a_chars, &b_chars);
    let score = (2 * common) as f64 / total as f64 * 100.0;
    score.round().min(100.0) as u8
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_tokens() {
        assert_eq!(sorted_tokens("Salary_Annual"), "annual salary");
        assert_eq!(sorted_tokens("  Job-Title "), "job title");
    }

    #[test]
    fn test_identical_and_disjoint() {
        assert_eq!(token_sort_ratio("Age", "age"), 100);
        assert_eq!(token_sort_ratio("title job", "Job_Title"), 100);
        assert_eq!(ratio("abc", "xyz"), 0);
        assert_eq!(ratio("", ""), 100);
    }

    #[test]
    fn test_partial_similarity() {
        // "salary" is fully contained in "annual salary": 2*6/19
        assert_eq!(token_sort_ratio("salary", "Annual_Salary"), 63);
        assert!(token_sort_ratio("overtme", "Overtime_Hours") >= 50);
        assert!(token_sort_ratio("gender", "Department") < 80);
    }
}
