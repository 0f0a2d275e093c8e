//! Map keyed by [`Parameter`] that iterates in canonical parameter order.

use crate::Parameter;
use std::{collections::BTreeMap, ops::Deref};

/// Wrapper of [`BTreeMap`]`<`[`Parameter`]`, V>`. As [`Parameter`]'s ordering is the canonical parameter order,
/// iteration (and therefore anything serialized from this map) is deterministic regardless of how the map was
/// populated.
///
/// This type [`Deref`]s to [`BTreeMap`], so all immutable [`BTreeMap`] methods are available; there is no
/// mutable access once the map is built.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParamMap<V>(BTreeMap<Parameter, V>);

impl<V> ParamMap<V> {
    /// Builds a map with an entry for every [`Parameter`], in canonical order.
    pub fn from_fn(mut f: impl FnMut(Parameter) -> V) -> Self {
        Parameter::ALL.iter().map(|&p| (p, f(p))).collect()
    }

    /// Returns a new [`ParamMap`] with values corresponding to the invocation of function `f` on the original
    /// entries. Entries for which `f` returns `None` are dropped.
    pub fn filter_map_values<V1>(&self, mut f: impl FnMut(Parameter, &V) -> Option<V1>) -> ParamMap<V1> {
        self.0
            .iter()
            .filter_map(|(&p, v)| f(p, v).map(|v1| (p, v1)))
            .collect()
    }
}

impl<V> From<BTreeMap<Parameter, V>> for ParamMap<V> {
    fn from(value: BTreeMap<Parameter, V>) -> Self {
        Self(value)
    }
}

impl<V> FromIterator<(Parameter, V)> for ParamMap<V> {
    fn from_iter<I: IntoIterator<Item = (Parameter, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V> Deref for ParamMap<V> {
    type Target = BTreeMap<Parameter, V>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<V> IntoIterator for ParamMap<V> {
    type Item = (Parameter, V);
    type IntoIter = <BTreeMap<Parameter, V> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a ParamMap<V> {
    type Item = (&'a Parameter, &'a V);
    type IntoIter = <&'a BTreeMap<Parameter, V> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Per-parameter sample lists harvested from one log. Every [`Parameter`] has an entry; parameters absent from
/// the log have an empty list. Samples keep their order of appearance in the log.
pub type ParameterSet = ParamMap<Vec<i64>>;

impl ParamMap<Vec<i64>> {
    /// Returns a [`ParameterSet`] with an empty sample list for every parameter.
    pub fn empty() -> Self {
        Self::from_fn(|_| Vec::new())
    }

    /// Samples recorded for `parameter`, empty if none were recorded.
    pub fn samples(&self, parameter: Parameter) -> &[i64] {
        self.0.get(&parameter).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of samples across all parameters.
    pub fn total_samples(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}
