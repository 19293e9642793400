use mesh_cache::prelude::*;
use proptest::prelude::*;

#[test]
fn factory_starts_modified_and_copies_borrowed_input() {
    let src = vec![[1.0f64, 2.0], [3.0, 4.0]];
    let a = make_tracked_array::<f64, _>(Some(&src[..])).unwrap();
    assert!(a.is_modified());
    assert_eq!(a.shape(), &[2, 2]);
    assert!(a.mutable());
    assert!(!a.is_view());

    let empty = make_tracked_array::<f64, Vec<f64>>(None).unwrap();
    assert!(empty.is_empty());
    assert!(make_tracked_array::<i32, _>(Some(vec![vec![1], vec![2, 3]])).is_err());
}

#[test]
fn views_are_read_only_until_unlocked() {
    let a = make_tracked_array(Some(vec![1i32, 2, 3, 4])).unwrap();
    a.set_modified(false);
    let mut v = a.view();
    assert!(v.is_view_of(&a));
    assert_eq!(v.add_assign(1i32), Err(MeshCacheError::WriteProtection("view")));
    assert!(!a.is_modified());
    v.set_mutable(true);
    v.add_assign(1i32).unwrap();
    assert!(v.is_modified());
    assert!(a.is_modified());
    assert_eq!(a.to_vec().unwrap(), vec![2, 3, 4, 5]);
}

#[test]
fn view_of_view_reports_root() {
    let a = make_tracked_array::<i64, _>(Some(vec![[0i64, 1], [2, 3], [4, 5]])).unwrap();
    let rows = a.rows(1..3).unwrap();
    let mut row = rows.row(0).unwrap();
    assert!(row.is_view_of(&a));
    assert!(!row.is_view_of(&rows));
    a.set_modified(false);
    row.set_mutable(true);
    row.set(&[1], 30).unwrap();
    assert!(a.is_modified());
    assert_eq!(a.get(&[1, 1]).unwrap(), Some(30));
}

#[test]
fn duplicate_is_detached() {
    let mut a = make_tracked_array(Some(vec![1u8, 2])).unwrap();
    let d = a.duplicate().unwrap();
    a.fill(9).unwrap();
    assert_eq!(d.as_slice(), &[1, 2]);
}

#[test]
fn cast_builds_new_root() {
    let a = make_tracked_array(Some(vec![1i32, -2])).unwrap();
    let f = a.cast::<f64>().unwrap();
    assert_eq!(f.to_vec().unwrap(), vec![1.0, -2.0]);
    assert!(matches!(a.cast::<u8>(), Err(MeshCacheError::Cast(1))));
}

#[test]
fn dropped_root_leaves_view_usable() {
    let a = make_tracked_array(Some(vec![1.0f32, 2.0])).unwrap();
    let mut v = a.view();
    drop(a);
    assert_eq!(v.source_modified(), None);
    v.set_mutable(true);
    v.mul_assign(2.0f32).unwrap();
    assert_eq!(v.to_vec().unwrap(), vec![2.0, 4.0]);
}

proptest! {
    #[test]
    fn any_view_write_marks_root(len in 1usize..20, start in 0usize..20, value in -100i64..100) {
        let start = start % len;
        let a = make_tracked_array(Some((0..len as i64).collect::<Vec<_>>())).unwrap();
        a.set_modified(false);
        let mut v = a.rows(start..len).unwrap();
        v.set_mutable(true);
        v.set(&[0], value).unwrap();
        prop_assert!(a.is_modified());
        prop_assert_eq!(a.get(&[start]).unwrap(), Some(value));
    }
}
