//! # Queries
//!
//! [`EntityList::for_each`](super::EntityList::for_each) takes a
//! [`QueryParam`] such as `(&Transform, &mut Velocity)` and calls a closure once
//! per entity whose archetype holds every requested type.
//!
//! Iteration is closure-based. For each matching archetype the requested
//! columns are lifted out of the table's column map, so `&A` and `&mut B`
//! come from different owned values and the borrow checker is satisfied
//! without unsafe code. The columns go back in when the archetype is done.
//!
//! The closure never sees the [`EntityList`](super::EntityList) itself, so it
//! cannot create or destroy entities mid-pass: every entity that matched when
//! the call started is visited exactly once, and nothing else is.
//!
//! [`ComponentSet`] is the type-only sibling used for presence checks
//! (`has_all`, `has_any`, query filters).

use std::any::TypeId;
use std::collections::HashMap;

use super::archetype::Column;

/// A fetchable borrow of component data: `&T`, `&mut T`, or a tuple of those.
///
/// Requesting the same type twice in one query panics before any column is
/// touched.
pub trait QueryParam {
    type Item<'w>;
    type Column;

    fn type_ids() -> Vec<TypeId>;
    fn extract(columns: &mut HashMap<TypeId, Column>) -> Self::Column;
    fn restore(column: Self::Column, columns: &mut HashMap<TypeId, Column>);
    fn fetch(column: &mut Self::Column, row: usize) -> Self::Item<'_>;
}

fn lift<T: 'static>(columns: &mut HashMap<TypeId, Column>) -> (TypeId, Column) {
    let type_id = TypeId::of::<T>();
    match columns.remove(&type_id) {
        Some(column) => (type_id, column),
        None => panic!(
            "query requested `{}` twice or from an archetype without it",
            std::any::type_name::<T>()
        ),
    }
}

fn mismatch<T>() -> ! {
    panic!(
        "component column for `{}` holds a different type",
        std::any::type_name::<T>()
    )
}

impl<T: 'static + Send + Sync> QueryParam for &T {
    type Item<'w> = &'w T;
    type Column = (TypeId, Column);

    fn type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn extract(columns: &mut HashMap<TypeId, Column>) -> Self::Column {
        lift::<T>(columns)
    }

    fn restore(column: Self::Column, columns: &mut HashMap<TypeId, Column>) {
        columns.insert(column.0, column.1);
    }

    fn fetch(column: &mut Self::Column, row: usize) -> Self::Item<'_> {
        column.1.get::<T>(row).unwrap_or_else(|| mismatch::<T>())
    }
}

impl<T: 'static + Send + Sync> QueryParam for &mut T {
    type Item<'w> = &'w mut T;
    type Column = (TypeId, Column);

    fn type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn extract(columns: &mut HashMap<TypeId, Column>) -> Self::Column {
        lift::<T>(columns)
    }

    fn restore(column: Self::Column, columns: &mut HashMap<TypeId, Column>) {
        columns.insert(column.0, column.1);
    }

    fn fetch(column: &mut Self::Column, row: usize) -> Self::Item<'_> {
        column.1.get_mut::<T>(row).unwrap_or_else(|| mismatch::<T>())
    }
}

macro_rules! impl_query_param_tuple {
    ($($P:ident),+) => {
        impl<$($P: QueryParam),+> QueryParam for ($($P,)+) {
            type Item<'w> = ($($P::Item<'w>,)+);
            type Column = ($($P::Column,)+);

            fn type_ids() -> Vec<TypeId> {
                let mut ids = Vec::new();
                $(ids.extend($P::type_ids());)+
                ids
            }

            fn extract(columns: &mut HashMap<TypeId, Column>) -> Self::Column {
                ($($P::extract(columns),)+)
            }

            #[allow(non_snake_case)]
            fn restore(column: Self::Column, columns: &mut HashMap<TypeId, Column>) {
                let ($($P,)+) = column;
                $($P::restore($P, columns);)+
            }

            #[allow(non_snake_case)]
            fn fetch(column: &mut Self::Column, row: usize) -> Self::Item<'_> {
                let ($($P,)+) = column;
                ($($P::fetch($P, row),)+)
            }
        }
    };
}

impl_query_param_tuple!(A);
impl_query_param_tuple!(A, B);
impl_query_param_tuple!(A, B, C);
impl_query_param_tuple!(A, B, C, D);
impl_query_param_tuple!(A, B, C, D, E);
impl_query_param_tuple!(A, B, C, D, E, F);
impl_query_param_tuple!(A, B, C, D, E, F, G);
impl_query_param_tuple!(A, B, C, D, E, F, G, H);

/// A set of component types, used for presence checks only.
///
/// Implemented for tuples of up to eight component types, e.g.
/// `list.has_any::<(Model, Material)>(e)`.
pub trait ComponentSet {
    fn type_ids() -> Vec<TypeId>;
}

macro_rules! impl_component_set {
    ($($T:ident),+) => {
        impl<$($T: 'static + Send + Sync),+> ComponentSet for ($($T,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$T>()),+]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);
