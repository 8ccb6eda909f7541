/// Allowed values for one cron column
///
/// A field is an immutable, sorted set of integers plus a flag recording
/// whether the column was authored as the bare wildcard `*`. The flag (not
/// the value set) drives the day-of-month/day-of-week combination rule, so
/// `*` and `0-59` produce the same values but different fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronField {
    values: Vec<u32>,
    restricted: bool,
}

impl CronField {
    /// Every value in `[min, max]`, unrestricted (authored as `*`)
    pub(crate) fn all(min: u32, max: u32) -> Self {
        Self {
            values: (min..=max).collect(),
            restricted: false,
        }
    }

    /// `min, min+step, min+2*step, ...` up to `max`, restricted
    ///
    /// Callers validate `step > 0` and `min <= max` before construction.
    pub(crate) fn range(min: u32, max: u32, step: u32) -> Self {
        Self {
            values: (min..=max).step_by(step as usize).collect(),
            restricted: true,
        }
    }

    /// Union of the value sets of `parts`, deduplicated and sorted
    ///
    /// The restricted flag is decided by the caller from the authored column
    /// text rather than derived from the parts.
    pub(crate) fn flatten(parts: Vec<CronField>, restricted: bool) -> Self {
        let mut values: Vec<u32> = parts.into_iter().flat_map(|f| f.values).collect();
        values.sort_unstable();
        values.dedup();
        Self { values, restricted }
    }

    /// Whether `v` is a member of this field
    pub fn test(&self, v: u32) -> bool {
        self.values.binary_search(&v).is_ok()
    }

    /// Smallest member strictly greater than `v`, if any
    pub fn next_after(&self, v: u32) -> Option<u32> {
        let idx = match self.values.binary_search(&v) {
            Ok(i) => i + 1,
            Err(i) => i,
        };
        self.values.get(idx).copied()
    }

    /// Smallest member (fields are never empty)
    pub fn min(&self) -> u32 {
        self.values[0]
    }

    /// Largest member
    pub fn max(&self) -> u32 {
        self.values[self.values.len() - 1]
    }

    /// Apply `f` to every member, keeping the restricted flag
    ///
    /// Used for the month 0-basing and day-of-week 7-folding rewrites; the
    /// result is re-sorted and deduplicated since a fold can collide values.
    pub(crate) fn map(&self, f: impl Fn(u32) -> u32) -> Self {
        let mut values: Vec<u32> = self.values.iter().map(|&v| f(v)).collect();
        values.sort_unstable();
        values.dedup();
        Self {
            values,
            restricted: self.restricted,
        }
    }

    /// Whether the column carried an explicit constraint (anything but `*`)
    pub fn restricted(&self) -> bool {
        self.restricted
    }

    pub(crate) fn values(&self) -> &[u32] {
        &self.values
    }
}
