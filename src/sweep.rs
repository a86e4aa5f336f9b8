// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Parameter Sweeps

//! Sweep construction.
//!
//! A [`Sweep`] starts from a base [`Params`] and a list of axes; each axis is
//! a list of labelled setters. The sweep space is the cartesian product of the
//! axes, optionally sub-sampled at random.

use rand::seq::index;
use rand::Rng;
use std::fmt;
use std::sync::Arc;

use crate::params::Params;

type Setter = Arc<dyn Fn(&mut Params) + Send + Sync>;

/// One swept dimension.
#[derive(Clone)]
pub struct SweepAxis {
    pub name: String,
    values: Vec<(String, Setter)>,
}

impl SweepAxis {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), values: Vec::new() }
    }

    /// Add one point on this axis.
    pub fn value(mut self, label: impl Into<String>, apply: impl Fn(&mut Params) + Send + Sync + 'static) -> Self {
        self.values.push((label.into(), Arc::new(apply)));
        self
    }

    /// One point per element of `values`, labelled with its `Debug` form.
    pub fn over<T, I, F>(name: impl Into<String>, values: I, apply: F) -> Self
    where
        T: fmt::Debug + Clone + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        F: Fn(&mut Params, T) + Send + Sync + 'static,
    {
        let apply = Arc::new(apply);
        let mut axis = Self::new(name);
        for value in values {
            let label = format!("{:?}", value);
            let apply = Arc::clone(&apply);
            axis = axis.value(label, move |params| apply(params, value.clone()));
        }
        axis
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for SweepAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SweepAxis")
            .field("name", &self.name)
            .field("values", &self.values.iter().map(|(label, _)| label.as_str()).collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Sweep {
    base: Params,
    axes: Vec<SweepAxis>,
    /// Append `axis=value` pairs to each point's label.
    label_points: bool,
}

impl Sweep {
    pub fn new(base: Params) -> Self {
        Self { base, axes: Vec::new(), label_points: true }
    }

    pub fn axis(mut self, axis: SweepAxis) -> Self {
        self.axes.push(axis);
        self
    }

    /// Keep each point's label as set by the axes themselves.
    pub fn keep_labels(mut self) -> Self {
        self.label_points = false;
        self
    }

    /// Size of the full cartesian product. Empty axes are skipped.
    pub fn len(&self) -> usize {
        self.axes.iter().filter(|a| !a.is_empty()).map(SweepAxis::len).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination, the last axis varying fastest.
    pub fn cartesian_product(&self) -> Vec<Params> {
        let mut points = vec![(self.base.clone(), Vec::<String>::new())];
        for axis in self.axes.iter().filter(|a| !a.is_empty()) {
            let mut next = Vec::with_capacity(points.len() * axis.len());
            for (params, tags) in &points {
                for (label, apply) in &axis.values {
                    let mut point = params.clone();
                    apply(&mut point);
                    let mut tags = tags.clone();
                    tags.push(format!("{}={}", axis.name, label));
                    next.push((point, tags));
                }
            }
            points = next;
        }

        points
            .into_iter()
            .map(|(mut params, tags)| {
                if self.label_points && !tags.is_empty() {
                    params.label = format!("{}[{}]", params.label, tags.join(","));
                }
                params
            })
            .collect()
    }

    /// `n` distinct points drawn uniformly from the product, in product
    /// order. Returns the whole product when `n` covers it.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<Params> {
        let all = self.cartesian_product();
        if n >= all.len() {
            return all;
        }
        let mut picked = index::sample(rng, all.len(), n).into_vec();
        picked.sort_unstable();
        picked.into_iter().map(|i| all[i].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::SupplyDefinition;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_axes() -> Sweep {
        Sweep::new(Params::default())
            .axis(SweepAxis::over("recipients", [2.0, 10.0], |p, v| p.reward_recipients = v))
            .axis(SweepAxis::over(
                "supply",
                [SupplyDefinition::Issued, SupplyDefinition::Earned, SupplyDefinition::Total],
                |p, v| p.credit_supply_definition = v,
            ))
    }

    #[test]
    fn test_cartesian_product_covers_every_combination() {
        let sweep = two_axes();
        let points = sweep.cartesian_product();
        assert_eq!(sweep.len(), 6);
        assert_eq!(points.len(), 6);
        assert_eq!(points[0].reward_recipients, 2.0);
        assert_eq!(points[2].credit_supply_definition, SupplyDefinition::Total);
        assert_eq!(points[3].reward_recipients, 10.0);
        assert_eq!(points[4].label, "standard[recipients=10.0,supply=Earned]");
    }

    #[test]
    fn test_sample_is_a_seeded_subset() {
        let sweep = two_axes();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let picked = sweep.sample(4, &mut rng);
        assert_eq!(picked.len(), 4);
        let labels: Vec<&str> = picked.iter().map(|p| p.label.as_str()).collect();
        let mut unique = labels.clone();
        unique.dedup();
        assert_eq!(unique.len(), 4);

        let mut again = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(sweep.sample(4, &mut again), picked);
        assert_eq!(sweep.sample(100, &mut again).len(), 6);
    }

    #[test]
    fn test_no_axes_yields_the_base() {
        let points = Sweep::new(Params::default()).cartesian_product();
        assert_eq!(points, vec![Params::default()]);
    }
}
