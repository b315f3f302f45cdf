// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Order-preserving sequence helpers used by the ordering engine.
//!
//! Every function here is deterministic and keeps the relative order of first
//! occurrences. Inputs are small (a handful of tags or module slots), so the
//! helpers favour linear scans over hashing.

/// Removes repeated items, keeping the first occurrence of each in place.
pub fn dedup_stable<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut unique: Vec<T> = Vec::new();
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

/// Groups items by key.
///
/// Groups appear in the order their key is first seen; items inside a group
/// keep their input order.
pub fn group_stable<T, K: PartialEq>(
    items: impl IntoIterator<Item = T>,
    mut key: impl FnMut(&T) -> K,
) -> Vec<(K, Vec<T>)> {
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        let item_key = key(&item);
        match groups.iter_mut().find(|(group_key, _)| *group_key == item_key) {
            Some((_, members)) => members.push(item),
            None => groups.push((item_key, vec![item])),
        }
    }
    groups
}

/// Returns the items of `items` that do not appear in `remove`, in input order.
pub fn difference<T: PartialEq>(items: impl IntoIterator<Item = T>, remove: &[T]) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| !remove.contains(item))
        .collect()
}

/// Returns the index of the first item matching `predicate`.
pub fn first_position<T>(items: &[T], predicate: impl FnMut(&T) -> bool) -> Option<usize> {
    items.iter().position(predicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_stable_keeps_first_occurrences() {
        assert_eq!(dedup_stable([3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup_stable(Vec::<u8>::new()).is_empty());
    }

    #[test]
    fn test_group_stable_orders_groups_by_first_sighting() {
        let groups = group_stable([(0, 'b'), (1, 'a'), (2, 'b'), (3, 'c'), (4, 'a')], |p| p.1);

        let keys: Vec<char> = groups.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec!['b', 'a', 'c']);
        assert_eq!(groups[0].1, vec![(0, 'b'), (2, 'b')]);
        assert_eq!(groups[1].1, vec![(1, 'a'), (4, 'a')]);
    }

    #[test]
    fn test_difference_preserves_order() {
        assert_eq!(difference([5, 4, 3, 2, 1], &[4, 2]), vec![5, 3, 1]);
        assert_eq!(difference([1, 2], &[]), vec![1, 2]);
    }

    #[test]
    fn test_first_position() {
        assert_eq!(first_position(&[1, 2, 3, 2], |v| *v == 2), Some(1));
        assert_eq!(first_position(&[1, 2, 3], |v| *v > 9), None);
    }
}
