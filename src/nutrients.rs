use std::iter::Sum;
use std::ops::Add;

use crate::models::Nutrients;

/// The additive identity.
pub fn zero() -> Nutrients {
    Nutrients::default()
}

pub fn add(a: Nutrients, b: Nutrients) -> Nutrients {
    Nutrients {
        calories: a.calories + b.calories,
        carbs: a.carbs + b.carbs,
        protein: a.protein + b.protein,
        fat: a.fat + b.fat,
        sugar: a.sugar + b.sugar,
    }
}

/// Folds [`add`] over `items`, starting from [`zero`].
pub fn sum_sequence<'a, I>(items: I) -> Nutrients
where
    I: IntoIterator<Item = &'a Nutrients>,
{
    items.into_iter().fold(zero(), |acc, n| add(acc, *n))
}

impl Add for Nutrients {
    type Output = Nutrients;

    fn add(self, rhs: Nutrients) -> Nutrients {
        add(self, rhs)
    }
}

impl Sum for Nutrients {
    fn sum<I: Iterator<Item = Nutrients>>(iter: I) -> Nutrients {
        iter.fold(zero(), add)
    }
}

impl<'a> Sum<&'a Nutrients> for Nutrients {
    fn sum<I: Iterator<Item = &'a Nutrients>>(iter: I) -> Nutrients {
        sum_sequence(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(calories: f64, carbs: f64, protein: f64, fat: f64, sugar: f64) -> Nutrients {
        Nutrients {
            calories,
            carbs,
            protein,
            fat,
            sugar,
        }
    }

    #[test]
    fn empty_sequence_is_zero() {
        let empty: Vec<Nutrients> = Vec::new();
        assert_eq!(sum_sequence(&empty), zero());
    }

    #[test]
    fn single_item_sums_to_itself() {
        let item = n(200.0, 30.0, 10.0, 5.0, 12.0);
        assert_eq!(sum_sequence(&[item]), item);
    }

    #[test]
    fn zero_is_identity() {
        let a = n(1.0, 2.0, 3.0, 4.0, 5.0);
        assert_eq!(add(a, zero()), a);
        assert_eq!(add(zero(), a), a);
    }

    #[test]
    fn order_does_not_change_the_total() {
        let items = vec![
            n(100.0, 10.0, 2.0, 1.0, 4.0),
            n(250.0, 0.0, 25.0, 15.0, 0.0),
            n(50.0, 12.0, 0.0, 0.0, 11.0),
        ];
        let mut reversed = items.clone();
        reversed.reverse();
        let rotated = vec![items[1], items[2], items[0]];

        let expected = n(400.0, 22.0, 27.0, 16.0, 15.0);
        assert_eq!(sum_sequence(&items), expected);
        assert_eq!(sum_sequence(&reversed), expected);
        assert_eq!(sum_sequence(&rotated), expected);
    }

    #[test]
    fn add_is_commutative_and_associative() {
        let a = n(1.0, 2.0, 3.0, 4.0, 5.0);
        let b = n(10.0, 20.0, 30.0, 40.0, 50.0);
        let c = n(100.0, 200.0, 300.0, 400.0, 500.0);
        assert_eq!(a + b, b + a);
        assert_eq!((a + b) + c, a + (b + c));
    }

    #[test]
    fn inputs_are_left_untouched() {
        let items = vec![n(1.0, 1.0, 1.0, 1.0, 1.0), n(2.0, 2.0, 2.0, 2.0, 2.0)];
        let before = items.clone();
        let total: Nutrients = items.iter().sum();
        assert_eq!(total, n(3.0, 3.0, 3.0, 3.0, 3.0));
        assert_eq!(items, before);
    }
}
