//! Drives the C entry points the way a host would: a `repr(C)` header on
//! the caller's side and nothing but handles and status codes in between.

use proptest::prelude::*;
use utlvec_ffi::*;
use utlvec_test_utils::{NativeMemory, NativeVector};

const OK: i32 = UtlStatus::Ok as i32;

fn empty_header() -> Box<NativeVector> {
    Box::new(NativeVector {
        memory: NativeMemory {
            memory: std::ptr::null_mut(),
            allocation_count: 0,
            grow_size: 0,
        },
        size: 0,
        elements: std::ptr::null_mut(),
    })
}

fn create(header: &mut NativeVector, element_size: usize) -> u64 {
    let mut h = 0;
    let addr: *mut NativeVector = header;
    assert_eq!(utlvec_create(addr.cast(), element_size, &mut h), OK);
    h
}

fn contents(h: u64) -> Vec<i32> {
    let mut n = 0;
    assert_eq!(utlvec_count(h, &mut n), OK);
    (0..n)
        .map(|i| {
            let mut v = 0;
            assert_eq!(utlvec_get_cell(h, i, &mut v), OK);
            v
        })
        .collect()
}

#[test]
fn header_tracks_every_call() {
    let mut header = empty_header();
    let h = create(&mut header, 4);

    for v in 0..65 {
        assert_eq!(utlvec_add_to_tail_cell(h, v, std::ptr::null_mut()), OK);
    }
    // The header is plain caller memory between calls.
    assert_eq!(header.size, 65);
    assert_eq!(header.memory.allocation_count, 128);
    assert_eq!(header.elements, header.memory.memory);

    assert_eq!(utlvec_remove(h, 0), OK);
    assert_eq!(header.size, 64);
    assert_eq!(contents(h)[0], 1);

    assert_eq!(utlvec_remove_all(h), OK);
    assert_eq!(header.size, 0);
    assert_eq!(header.memory.allocation_count, 128);

    assert_eq!(utlvec_destroy(h), OK);
    assert!(header.memory.memory.is_null());
    assert_eq!(header.memory.allocation_count, 0);
}

#[test]
fn grow_size_hint_set_by_host_is_honoured() {
    let mut header = empty_header();
    header.memory.grow_size = 10;
    let h = create(&mut header, 4);

    for v in 0..11 {
        assert_eq!(utlvec_add_to_tail_cell(h, v, std::ptr::null_mut()), OK);
    }
    assert_eq!(header.memory.allocation_count, 20);
    utlvec_destroy(h);
}

#[test]
fn two_handles_over_two_headers_are_independent() {
    let mut a = empty_header();
    let mut b = empty_header();
    let ha = create(&mut a, 4);
    let hb = create(&mut b, 4);

    utlvec_add_to_tail_cell(ha, 1, std::ptr::null_mut());
    utlvec_add_to_tail_cell(hb, 2, std::ptr::null_mut());
    utlvec_add_to_tail_cell(hb, 3, std::ptr::null_mut());

    assert_eq!(contents(ha), vec![1]);
    assert_eq!(contents(hb), vec![2, 3]);
    assert_eq!(utlvec_destroy(ha), OK);
    assert_eq!(contents(hb), vec![2, 3]);
    assert_eq!(utlvec_destroy(hb), OK);
}

#[derive(Clone, Debug)]
enum Call {
    Add(i32),
    Set(i32, i32),
    Remove(i32),
    RemoveAll,
    Find(i32),
}

fn call() -> impl Strategy<Value = Call> {
    prop_oneof![
        4 => any::<i32>().prop_map(Call::Add),
        2 => (-2i32..40, any::<i32>()).prop_map(|(i, v)| Call::Set(i, v)),
        2 => (-2i32..40).prop_map(Call::Remove),
        1 => Just(Call::RemoveAll),
        2 => (0i32..8).prop_map(Call::Find),
    ]
}

proptest! {
    #[test]
    fn c_calls_match_vec_model(calls in prop::collection::vec(call(), 1..120)) {
        let mut header = empty_header();
        let h = create(&mut header, 4);
        let mut model: Vec<i32> = Vec::new();

        for c in calls {
            match c {
                Call::Add(v) => {
                    let mut index = -1;
                    prop_assert_eq!(utlvec_add_to_tail_cell(h, v, &mut index), OK);
                    prop_assert_eq!(index as usize, model.len());
                    model.push(v);
                }
                Call::Set(i, v) => {
                    let status = utlvec_set_cell(h, i, v);
                    if i >= 0 && (i as usize) < model.len() {
                        prop_assert_eq!(status, OK);
                        model[i as usize] = v;
                    } else {
                        prop_assert_eq!(status, UtlStatus::IndexOutOfRange as i32);
                    }
                }
                Call::Remove(i) => {
                    let status = utlvec_remove(h, i);
                    if i >= 0 && (i as usize) < model.len() {
                        prop_assert_eq!(status, OK);
                        model.remove(i as usize);
                    } else {
                        prop_assert_eq!(status, UtlStatus::IndexOutOfRange as i32);
                    }
                }
                Call::RemoveAll => {
                    prop_assert_eq!(utlvec_remove_all(h), OK);
                    model.clear();
                }
                Call::Find(v) => {
                    let mut index = 0;
                    prop_assert_eq!(utlvec_find_cell(h, v, &mut index), OK);
                    let expected = model.iter().position(|&x| x == v).map_or(-1, |p| p as i32);
                    prop_assert_eq!(index, expected);
                }
            }
            prop_assert_eq!(header.size as usize, model.len());
            prop_assert!(header.size <= header.memory.allocation_count);
            prop_assert_eq!(header.elements, header.memory.memory);
        }

        prop_assert_eq!(contents(h), model);
        prop_assert_eq!(utlvec_destroy(h), OK);
    }
}
