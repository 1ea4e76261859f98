//! Semantic containers: prefab pairs for the built-in value types.
//!
//! The fixed mapping from well-known types to unequal value pairs lives
//! here as [`Prefabricate`] impls; the [`ContainerRegistry`] holds the
//! caller-supplied overrides, which always win. Values are drawn from the
//! source's seeded RNG so they look arbitrary but reproduce exactly.

use std::any::{Any, TypeId, type_name};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::ffi::OsString;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::num::{
    NonZeroI8, NonZeroI16, NonZeroI32, NonZeroI64, NonZeroIsize, NonZeroU8, NonZeroU16,
    NonZeroU32, NonZeroU64, NonZeroUsize, Wrapping,
};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::prefab::{Prefabricate, SynthesisError, ValuePair, ValueSource};

/// Caller-registered value pairs, keyed by type.
///
/// A registered pair always overrides the built-in impl for its type.
/// Distinctness is recorded at registration so an accidentally equal pair
/// surfaces as a precondition error instead of silently disabling probes.
pub struct ContainerRegistry {
    entries: HashMap<TypeId, RegisteredPair>,
}

struct RegisteredPair {
    pair: Box<dyn Any>,
    distinct: bool,
    type_name: &'static str,
}

impl ContainerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Register a pair for `T`, replacing any previous registration.
    pub fn register<T: Clone + PartialEq + 'static>(&mut self, red: T, black: T) {
        let distinct = red != black;
        let pair = ValuePair::new(red, black).with_distinct(distinct);
        self.entries.insert(
            TypeId::of::<T>(),
            RegisteredPair { pair: Box::new(pair), distinct, type_name: type_name::<T>() },
        );
    }

    /// Look up a registered pair for `T`.
    pub fn lookup<T: Clone + 'static>(&self) -> Option<ValuePair<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.pair.downcast_ref::<ValuePair<T>>())
            .cloned()
    }

    /// Whether a pair is registered for `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Type names of registered pairs whose members compare equal.
    pub(crate) fn equal_pairs(&self) -> Vec<&'static str> {
        let mut names: Vec<_> =
            self.entries.values().filter(|e| !e.distinct).map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ContainerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const WORDS: [&str; 12] = [
    "amber", "basalt", "cobalt", "dune", "ember", "fjord", "garnet", "heron", "indigo", "juniper",
    "krill", "lichen",
];

fn word_pair(source: &mut ValueSource) -> (&'static str, &'static str) {
    let red = source.rng().gen_range(0..WORDS.len());
    let black = loop {
        let candidate = source.rng().gen_range(0..WORDS.len());
        if candidate != red {
            break candidate;
        }
    };
    (WORDS[red], WORDS[black])
}

macro_rules! prefab_int {
    ($($t:ty),* $(,)?) => {$(
        impl Prefabricate for $t {
            fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
                let red: $t = source.rng().gen_range(1..=100);
                let black: $t = loop {
                    let candidate = source.rng().gen_range(1..=100);
                    if candidate != red {
                        break candidate;
                    }
                };
                Ok(ValuePair::new(red, black))
            }
        }
    )*};
}

prefab_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! prefab_float {
    ($($t:ty),* $(,)?) => {$(
        impl Prefabricate for $t {
            fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
                let red: $t = source.rng().gen_range((0.5 as $t)..(100.0 as $t));
                let black: $t = loop {
                    let candidate = source.rng().gen_range((0.5 as $t)..(100.0 as $t));
                    if candidate != red {
                        break candidate;
                    }
                };
                Ok(ValuePair::new(red, black))
            }
        }
    )*};
}

prefab_float!(f32, f64);

impl Prefabricate for bool {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let red = source.rng().gen_bool(0.5);
        Ok(ValuePair::new(red, !red))
    }
}

impl Prefabricate for char {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let red = source.rng().gen_range('a'..='z');
        let black = loop {
            let candidate = source.rng().gen_range('a'..='z');
            if candidate != red {
                break candidate;
            }
        };
        Ok(ValuePair::new(red, black))
    }
}

impl Prefabricate for String {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let (red, black) = word_pair(source);
        Ok(ValuePair::new(red.to_string(), black.to_string()))
    }
}

impl Prefabricate for &'static str {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let (red, black) = word_pair(source);
        Ok(ValuePair::new(red, black))
    }
}

impl<T: Prefabricate> Prefabricate for Option<T> {
    // `None` is reserved for the absence probes; both members are `Some` so
    // a mutation probe actually exercises the inner value.
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let inner = source.pair::<T>()?;
        let distinct = inner.is_distinct();
        Ok(ValuePair::new(Some(inner.red), Some(inner.black)).with_distinct(distinct))
    }
}

impl<T: Prefabricate, E: Prefabricate> Prefabricate for Result<T, E> {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let ok = source.pair::<T>()?;
        let err = source.pair::<E>()?;
        Ok(ValuePair::new(Ok(ok.red), Err(err.red)))
    }
}

macro_rules! prefab_seq {
    ($($t:ident),* $(,)?) => {$(
        impl<T: Prefabricate> Prefabricate for $t<T> {
            fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
                let inner = source.pair::<T>()?;
                let distinct = inner.is_distinct();
                Ok(ValuePair::new(
                    $t::from_iter([inner.red]),
                    $t::from_iter([inner.black]),
                )
                .with_distinct(distinct))
            }
        }
    )*};
}

prefab_seq!(Vec, VecDeque, LinkedList);

impl<T: Prefabricate, const N: usize> Prefabricate for [T; N] {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let inner = source.pair::<T>()?;
        let red = std::array::from_fn(|_| inner.red.clone());
        let black = std::array::from_fn(|_| inner.black.clone());
        Ok(ValuePair::new(red, black).with_distinct(N > 0 && inner.is_distinct()))
    }
}

macro_rules! prefab_tuple {
    ($(($($var:ident : $ty:ident),+)),+ $(,)?) => {$(
        impl<$($ty: Prefabricate),+> Prefabricate for ($($ty,)+) {
            fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
                $(let $var = source.pair::<$ty>()?;)+
                Ok(ValuePair::new(($($var.red,)+), ($($var.black,)+)))
            }
        }
    )+};
}

prefab_tuple!(
    (a: A),
    (a: A, b: B),
    (a: A, b: B, c: C),
    (a: A, b: B, c: C, d: D),
);

impl<K, V> Prefabricate for HashMap<K, V>
where
    K: Prefabricate + Eq + std::hash::Hash,
    V: Prefabricate,
{
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let key = source.pair::<K>()?;
        let value = source.pair::<V>()?;
        Ok(ValuePair::new(
            HashMap::from_iter([(key.red, value.red)]),
            HashMap::from_iter([(key.black, value.black)]),
        ))
    }
}

impl<K, V> Prefabricate for BTreeMap<K, V>
where
    K: Prefabricate + Ord,
    V: Prefabricate,
{
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let key = source.pair::<K>()?;
        let value = source.pair::<V>()?;
        Ok(ValuePair::new(
            BTreeMap::from_iter([(key.red, value.red)]),
            BTreeMap::from_iter([(key.black, value.black)]),
        ))
    }
}

impl<T: Prefabricate + Eq + std::hash::Hash> Prefabricate for HashSet<T> {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let inner = source.pair::<T>()?;
        let distinct = inner.is_distinct();
        Ok(ValuePair::new(HashSet::from_iter([inner.red]), HashSet::from_iter([inner.black]))
            .with_distinct(distinct))
    }
}

impl<T: Prefabricate + Ord> Prefabricate for BTreeSet<T> {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let inner = source.pair::<T>()?;
        let distinct = inner.is_distinct();
        Ok(ValuePair::new(BTreeSet::from_iter([inner.red]), BTreeSet::from_iter([inner.black]))
            .with_distinct(distinct))
    }
}

macro_rules! prefab_wrapper {
    ($($t:ident),* $(,)?) => {$(
        impl<T: Prefabricate> Prefabricate for $t<T> {
            fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
                let inner = source.pair::<T>()?;
                let distinct = inner.is_distinct();
                Ok(ValuePair::new($t::new(inner.red), $t::new(inner.black))
                    .with_distinct(distinct))
            }
        }
    )*};
}

prefab_wrapper!(Box, Rc, Arc, RefCell);

impl<T: Prefabricate + Copy> Prefabricate for Cell<T> {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let inner = source.pair::<T>()?;
        Ok(ValuePair::new(Cell::new(inner.red), Cell::new(inner.black))
            .with_distinct(inner.is_distinct()))
    }
}

impl<T: Prefabricate> Prefabricate for Wrapping<T> {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let inner = source.pair::<T>()?;
        let distinct = inner.is_distinct();
        Ok(ValuePair::new(Wrapping(inner.red), Wrapping(inner.black))
            .with_distinct(distinct))
    }
}

macro_rules! prefab_nonzero {
    ($(($nz:ty, $t:ty)),* $(,)?) => {$(
        impl Prefabricate for $nz {
            fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
                // The integer pair is drawn from 1..=100, so `new` never
                // actually falls back.
                let inner = source.pair::<$t>()?;
                Ok(ValuePair::new(
                    <$nz>::new(inner.red).unwrap_or(<$nz>::MIN),
                    <$nz>::new(inner.black).unwrap_or(<$nz>::MIN),
                ))
            }
        }
    )*};
}

prefab_nonzero!(
    (NonZeroI8, i8),
    (NonZeroI16, i16),
    (NonZeroI32, i32),
    (NonZeroI64, i64),
    (NonZeroIsize, isize),
    (NonZeroU8, u8),
    (NonZeroU16, u16),
    (NonZeroU32, u32),
    (NonZeroU64, u64),
    (NonZeroUsize, usize),
);

impl Prefabricate for Duration {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let red = source.rng().gen_range(1..=86_400u64);
        let black = loop {
            let candidate = source.rng().gen_range(1..=86_400u64);
            if candidate != red {
                break candidate;
            }
        };
        Ok(ValuePair::new(Duration::from_secs(red), Duration::from_secs(black)))
    }
}

impl Prefabricate for SystemTime {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let offsets = source.pair::<Duration>()?;
        Ok(ValuePair::new(UNIX_EPOCH + offsets.red, UNIX_EPOCH + offsets.black))
    }
}

fn instant_anchor() -> Instant {
    // Instants cannot be constructed from a constant. A process-wide
    // anchor keeps replayed syntheses equal to each other.
    static ANCHOR: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    *ANCHOR.get_or_init(Instant::now)
}

impl Prefabricate for Instant {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let base = instant_anchor();
        let offset = source.rng().gen_range(1..=10_000u64);
        Ok(ValuePair::new(base, base + Duration::from_millis(offset)))
    }
}

impl Prefabricate for PathBuf {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let (red, black) = word_pair(source);
        Ok(ValuePair::new(
            PathBuf::from(format!("/opt/{red}")),
            PathBuf::from(format!("/opt/{black}")),
        ))
    }
}

impl Prefabricate for OsString {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let (red, black) = word_pair(source);
        Ok(ValuePair::new(OsString::from(red), OsString::from(black)))
    }
}

impl Prefabricate for Ipv4Addr {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let red = source.rng().gen_range(1..=254u8);
        let black = loop {
            let candidate = source.rng().gen_range(1..=254u8);
            if candidate != red {
                break candidate;
            }
        };
        Ok(ValuePair::new(Ipv4Addr::new(10, 0, 0, red), Ipv4Addr::new(10, 0, 0, black)))
    }
}

impl Prefabricate for Ipv6Addr {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let red = source.rng().gen_range(1..=0xfffeu16);
        let black = loop {
            let candidate = source.rng().gen_range(1..=0xfffeu16);
            if candidate != red {
                break candidate;
            }
        };
        Ok(ValuePair::new(
            Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, red),
            Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, black),
        ))
    }
}

impl Prefabricate for IpAddr {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let v4 = source.pair::<Ipv4Addr>()?;
        let v6 = source.pair::<Ipv6Addr>()?;
        Ok(ValuePair::new(IpAddr::V4(v4.red), IpAddr::V6(v6.black)))
    }
}

impl Prefabricate for SocketAddr {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
        let ip = source.pair::<Ipv4Addr>()?;
        let port = source.rng().gen_range(1024..=65_535u16);
        Ok(ValuePair::new(
            SocketAddr::new(IpAddr::V4(ip.red), port),
            SocketAddr::new(IpAddr::V4(ip.black), port),
        ))
    }
}

#[cfg(feature = "datetime")]
mod datetime {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
    use rand::Rng;

    use super::{Prefabricate, SynthesisError, ValuePair, ValueSource};

    impl Prefabricate for NaiveDate {
        fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
            let draw = |source: &mut ValueSource| {
                let year = source.rng().gen_range(1990..=2030);
                let month = source.rng().gen_range(1..=12u32);
                let day = source.rng().gen_range(1..=28u32);
                NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
            };
            let red = draw(source);
            let black = loop {
                let candidate = draw(source);
                if candidate != red {
                    break candidate;
                }
            };
            Ok(ValuePair::new(red, black))
        }
    }

    impl Prefabricate for NaiveTime {
        fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
            let red = source.rng().gen_range(0..86_400u32);
            let black = loop {
                let candidate = source.rng().gen_range(0..86_400u32);
                if candidate != red {
                    break candidate;
                }
            };
            Ok(ValuePair::new(
                NaiveTime::from_num_seconds_from_midnight_opt(red, 0).unwrap_or_default(),
                NaiveTime::from_num_seconds_from_midnight_opt(black, 0).unwrap_or_default(),
            ))
        }
    }

    impl Prefabricate for NaiveDateTime {
        fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
            let date = source.pair::<NaiveDate>()?;
            let time = source.pair::<NaiveTime>()?;
            Ok(ValuePair::new(date.red.and_time(time.red), date.black.and_time(time.black)))
        }
    }

    impl Prefabricate for DateTime<Utc> {
        fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
            let red = source.rng().gen_range(1..=1_900_000_000i64);
            let black = loop {
                let candidate = source.rng().gen_range(1..=1_900_000_000i64);
                if candidate != red {
                    break candidate;
                }
            };
            Ok(ValuePair::new(
                DateTime::from_timestamp(red, 0).unwrap_or_default(),
                DateTime::from_timestamp(black, 0).unwrap_or_default(),
            ))
        }
    }
}
