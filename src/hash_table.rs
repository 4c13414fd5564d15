//! A Robin Hood hash table with one-byte control metadata per slot.
//!
//! The table is a single open-addressed slot array probed linearly from the
//! home slot a hash maps to. On insertion, an entry that has probed further
//! than the occupant it meets takes that occupant's slot, and the evicted
//! entry carries on down the sequence. This keeps probe lengths tightly
//! clustered around the mean: a lookup can bail out as soon as it reaches a
//! slot whose occupant sits closer to home than the walker has already
//! travelled, so misses don't have to scan all the way to the next empty
//! slot the way plain linear probing does.
//!
//! ## Design
//!
//! All storage lives in one contiguous type-erased allocation:
//! `[ control bytes | cached hashes | values ]`
//!
//! A probe walk touches only the control bytes until it has a candidate
//! slot. Each control byte is either `EMPTY` (0xFF), `TOMBSTONE` (0x80), or
//! a 7-bit fingerprint of the occupant's hash (0x01 through 0x7F, high bit
//! clear). The fingerprint is taken from the top bits of the hash so that it
//! stays uncorrelated with the home slot, which comes from the low bits;
//! fingerprint zero is remapped to one so an occupied byte can never alias a
//! sentinel. "High bit set" doubles as the free-or-deleted predicate. Tag
//! filtering rejects almost every non-matching slot before the value array
//! is ever read.
//!
//! Each entry's full 64-bit hash is cached beside it. Probe distances and
//! resizing work from the cache, so the table never re-hashes a key it
//! already holds and never has to thread a hash function through its
//! internals.
//!
//! Capacities are powers of two (minimum 8) so the home slot is a mask of
//! the hash rather than a modulo. The table doubles when live entries plus
//! tombstones would exceed 7/8 of the slots. Counting tombstones in that
//! threshold matters: a tombstone occupies a probe chain just as an entry
//! does, and the 1/8 floor of truly empty slots is what bounds every walk.
//! Growth re-seats the survivors from their cached hashes and drops the
//! accumulated tombstones wholesale. The table never shrinks; `clear`
//! resets the metadata without touching the allocation.
//!
//! ### Tombstones keep their distance
//!
//! Deletion writes a tombstone and leaves the dead entry's hash in the
//! cache. That ghost hash carries real weight: the early-exit rule is only
//! sound if the distance bound holds at every slot a chain runs through. A
//! tombstone reclaimed by an entry probing a *shorter* distance than its
//! previous occupant would sit in the middle of someone else's chain
//! looking richer than the walker, cutting the chain off; keys past the
//! cut would still be in the table but unreachable. With the ghost hash in
//! place, lookups apply the usual distance bound at tombstones, and
//! insertion only reclaims one when the incoming entry has probed strictly
//! further than the ghost had. Reinserting a removed key therefore walks
//! past its old slot and finds any surviving occurrence instead of
//! shadowing it.
//!
//! [`HashTable<V>`] stores values of type `V` and asks the caller for the
//! hash value and an equality predicate on each operation. Prefer
//! [`HashMap<K, V>`] or [`HashSet<T>`] for a keyed interface unless you are
//! implementing your own map or set structure.
//!
//! [`HashMap<K, V>`]: crate::hash_map::HashMap
//! [`HashSet<T>`]: crate::hash_set::HashSet

use alloc::alloc::handle_alloc_error;
use core::alloc::Layout;
use core::fmt::Debug;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

/// Control byte for a slot that has never held an entry since the last
/// rehash. All bits set, so the initial metadata fill is a single memset.
const EMPTY: u8 = 0xFF;

/// Control byte for a vacated slot that is still part of a probe chain.
const TOMBSTONE: u8 = 0x80;

const MIN_CAPACITY: usize = 8;

#[inline(always)]
fn is_occupied(ctrl: u8) -> bool {
    ctrl & 0x80 == 0
}

#[inline(always)]
fn control_tag(hash: u64) -> u8 {
    // Top seven bits, uncorrelated with the home-slot bits at the bottom.
    // Zero is remapped so an occupied byte can never alias EMPTY or
    // TOMBSTONE.
    let tag = (hash >> 57) as u8;
    if tag == 0 { 1 } else { tag }
}

#[inline(always)]
fn load_limit(capacity: usize) -> usize {
    (capacity >> 3) * 7
}

#[derive(Debug, Clone, Copy)]
struct DataLayout {
    layout: Layout,
    hashes_offset: usize,
    slots_offset: usize,
}

impl DataLayout {
    fn new<V>(capacity: usize) -> Self {
        let ctrl_layout = Layout::array::<u8>(capacity).expect("allocation size overflow");
        let hashes_layout = Layout::array::<u64>(capacity).expect("allocation size overflow");
        let slots_layout =
            Layout::array::<MaybeUninit<V>>(capacity).expect("allocation size overflow");

        let (layout, _) = Layout::new::<()>().extend(ctrl_layout).unwrap();
        let (layout, hashes_offset) = layout.extend(hashes_layout).unwrap();
        let (layout, slots_offset) = layout.extend(slots_layout).unwrap();

        DataLayout {
            layout,
            hashes_offset,
            slots_offset,
        }
    }
}

fn allocate(layout: &DataLayout) -> NonNull<u8> {
    // SAFETY: the layout covers at least MIN_CAPACITY slots, so it is never
    // zero-sized. Allocation failure aborts via `handle_alloc_error` without
    // any table state having been touched.
    unsafe {
        let raw = alloc::alloc::alloc(layout.layout);
        if raw.is_null() {
            handle_alloc_error(layout.layout);
        }

        core::ptr::write_bytes(raw, EMPTY, layout.hashes_offset);
        // Zero the hash cache so stale slots always hold initialized scalars.
        core::ptr::write_bytes(
            raw.add(layout.hashes_offset),
            0x0,
            layout.slots_offset - layout.hashes_offset,
        );

        NonNull::new_unchecked(raw)
    }
}

/// A Robin Hood hash table storing values of type `V`.
///
/// This is a fairly low-level structure: every operation takes the hash
/// value for the probe and an equality predicate over stored values. The
/// table caches each entry's hash, so no re-hashing callback is ever
/// needed.
///
/// ## Performance Characteristics
///
/// - **Memory**: 9 bytes per slot overhead (control byte plus cached hash),
///   plus the size of `V`.
/// - **Operations**: amortized O(1) insertion, O(1) expected lookup and
///   removal; a single insertion that triggers growth is O(capacity).
pub struct HashTable<V> {
    layout: DataLayout,
    alloc: NonNull<u8>,
    mask: usize,
    populated: usize,
    tombstones: usize,
    load_limit: usize,

    _phantom: core::marker::PhantomData<V>,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::vec::Vec;

        // SAFETY: the control array spans `capacity` initialized bytes.
        let control = unsafe {
            self.ctrl_ptr()
                .as_ref()
                .chunks(8)
                .map(|chunk| {
                    let cells: Vec<String> = chunk
                        .iter()
                        .map(|&ctrl| match ctrl {
                            EMPTY => String::from(".."),
                            TOMBSTONE => String::from("xx"),
                            tag => format!("{tag:02x}"),
                        })
                        .collect();
                    cells.join(" ")
                })
                .collect::<Vec<_>>()
        };

        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("tombstones", &self.tombstones)
            .field("capacity", &(self.mask + 1))
            .field("control", &control)
            .finish()
    }
}

impl<V> Clone for HashTable<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        let alloc = allocate(&self.layout);
        let new_table = Self {
            layout: self.layout,
            alloc,
            mask: self.mask,
            populated: self.populated,
            tombstones: self.tombstones,
            load_limit: self.load_limit,
            _phantom: core::marker::PhantomData,
        };

        // SAFETY: both allocations share `self.layout`. Values are cloned
        // first while the new control array still reads all-EMPTY, then the
        // control and hash regions are copied wholesale; a panicking clone
        // leaks the values written so far but never drops an uninitialized
        // slot. The hash copy includes tombstone ghosts, which the probe
        // bound relies on.
        unsafe {
            for index in 0..=self.mask {
                if is_occupied(*self.ctrl_ptr().as_ref().get_unchecked(index)) {
                    new_table
                        .slots_ptr()
                        .as_mut()
                        .get_unchecked_mut(index)
                        .write(
                            self.slots_ptr()
                                .as_ref()
                                .get_unchecked(index)
                                .assume_init_ref()
                                .clone(),
                        );
                }
            }

            core::ptr::copy_nonoverlapping(
                self.alloc.as_ptr(),
                new_table.alloc.as_ptr(),
                self.layout.slots_offset,
            );
        }

        new_table
    }
}

impl<V> Drop for HashTable<V> {
    fn drop(&mut self) {
        // SAFETY: occupied control bytes mark exactly the initialized slots,
        // and the allocation matches `self.layout`.
        unsafe {
            if core::mem::needs_drop::<V>() && self.populated > 0 {
                for index in 0..=self.mask {
                    if is_occupied(*self.ctrl_ptr().as_ref().get_unchecked(index)) {
                        self.slots_ptr()
                            .as_mut()
                            .get_unchecked_mut(index)
                            .assume_init_drop();
                    }
                }
            }

            alloc::alloc::dealloc(self.alloc.as_ptr(), self.layout.layout);
        }
    }
}

impl<V> HashTable<V> {
    /// Creates a new hash table with at least the requested capacity.
    ///
    /// The capacity is rounded up to the next power of two, with a minimum
    /// of 8 slots. The table grows before live entries reach 7/8 of it.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.next_power_of_two().max(MIN_CAPACITY);
        let layout = DataLayout::new::<V>(capacity);
        let alloc = allocate(&layout);

        Self {
            layout,
            alloc,
            mask: capacity - 1,
            populated: 0,
            tombstones: 0,
            load_limit: load_limit(capacity),
            _phantom: core::marker::PhantomData,
        }
    }

    fn ctrl_ptr(&self) -> NonNull<[u8]> {
        // SAFETY: `alloc` always points at a live allocation laid out by
        // `self.layout`; the control array spans the first `capacity` bytes.
        NonNull::slice_from_raw_parts(self.alloc.cast(), self.mask + 1)
    }

    fn hashes_ptr(&self) -> NonNull<[u64]> {
        // SAFETY: `alloc` always points at a live allocation laid out by
        // `self.layout`; the hash cache starts at `hashes_offset` and holds
        // one u64 per slot.
        unsafe {
            NonNull::slice_from_raw_parts(
                self.alloc.add(self.layout.hashes_offset).cast(),
                self.mask + 1,
            )
        }
    }

    fn slots_ptr(&self) -> NonNull<[MaybeUninit<V>]> {
        // SAFETY: `alloc` always points at a live allocation laid out by
        // `self.layout`; the value array starts at `slots_offset` and holds
        // one slot per control byte.
        unsafe {
            NonNull::slice_from_raw_parts(
                self.alloc.add(self.layout.slots_offset).cast(),
                self.mask + 1,
            )
        }
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots in the table.
    ///
    /// Always a power of two of at least 8. The table grows before live
    /// entries reach 7/8 of this value.
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    #[inline(always)]
    fn home_index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Distance of a hash's probe walk at `index`, accounting for wrap.
    #[inline(always)]
    fn probe_distance(&self, hash: u64, index: usize) -> usize {
        index.wrapping_sub(hash as usize) & self.mask
    }

    /// Walks the probe sequence for `hash`, returning the slot holding a
    /// matching value.
    ///
    /// The walk stops at the first empty slot, or at the first slot whose
    /// occupant (or tombstone ghost) sits closer to home than the walk has
    /// travelled; past that point a match would contradict the placement
    /// rule.
    fn probe(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        if self.populated == 0 {
            return None;
        }

        let tag = control_tag(hash);
        let mut index = self.home_index(hash);
        let mut distance = 0;

        loop {
            // SAFETY: `index` is masked into range; slots are only read when
            // their control byte says occupied, and hashes are initialized
            // for every non-empty control byte.
            unsafe {
                let ctrl = *self.ctrl_ptr().as_ref().get_unchecked(index);
                if ctrl == EMPTY {
                    return None;
                }

                let slot_hash = *self.hashes_ptr().as_ref().get_unchecked(index);
                if ctrl == tag
                    && slot_hash == hash
                    && eq(self
                        .slots_ptr()
                        .as_ref()
                        .get_unchecked(index)
                        .assume_init_ref())
                {
                    return Some(index);
                }

                // Tombstones retain their ghost's hash, so the displacement
                // bound applies to them exactly as it does to occupants.
                if distance > self.probe_distance(slot_hash, index) {
                    return None;
                }
            }

            index = (index + 1) & self.mask;
            distance += 1;
        }
    }

    /// Finds a value in the table by hash and equality predicate.
    ///
    /// Returns a reference to the value if found, or `None` if no matching
    /// value exists.
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.probe(hash, eq).map(|index| {
            // SAFETY: `probe` only returns slots whose control byte is
            // occupied, so the slot is initialized.
            unsafe {
                self.slots_ptr()
                    .as_ref()
                    .get_unchecked(index)
                    .assume_init_ref()
            }
        })
    }

    /// Finds a value in the table by hash and equality predicate, returning
    /// a mutable reference.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        self.probe(hash, eq).map(|index| {
            // SAFETY: `probe` only returns slots whose control byte is
            // occupied, so the slot is initialized.
            unsafe {
                self.slots_ptr()
                    .as_mut()
                    .get_unchecked_mut(index)
                    .assume_init_mut()
            }
        })
    }

    /// Removes and returns a value from the table.
    ///
    /// The vacated slot becomes a tombstone so probe chains running through
    /// it stay intact; it is reclaimed by a later insertion or by growth.
    /// Removing an absent value is a no-op.
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.probe(hash, eq)?;

        // SAFETY: `probe` returned an occupied slot. The cached hash stays
        // behind so the tombstone keeps its probe distance.
        unsafe {
            *self.ctrl_ptr().as_mut().get_unchecked_mut(index) = TOMBSTONE;
            self.populated -= 1;
            self.tombstones += 1;

            Some(
                self.slots_ptr()
                    .as_ref()
                    .get_unchecked(index)
                    .assume_init_read(),
            )
        }
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// Grows the table first if live entries plus tombstones have reached
    /// the load limit, so a vacant entry can always be filled without
    /// further allocation.
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        self.maybe_grow();

        let tag = control_tag(hash);
        let mut index = self.home_index(hash);
        let mut distance = 0;

        loop {
            // SAFETY: `index` is masked into range; slots are only read when
            // their control byte says occupied, and hashes are initialized
            // for every non-empty control byte.
            unsafe {
                let ctrl = *self.ctrl_ptr().as_ref().get_unchecked(index);
                if ctrl == EMPTY {
                    return Entry::Vacant(VacantEntry {
                        table: self,
                        hash,
                        index,
                        displaces: false,
                    });
                }

                let slot_hash = *self.hashes_ptr().as_ref().get_unchecked(index);
                let existing = self.probe_distance(slot_hash, index);
                if ctrl == TOMBSTONE {
                    // Strictly further than the ghost: taking the slot any
                    // earlier could strand live entries down the chain or
                    // shadow a surviving occurrence of this key.
                    if distance > existing {
                        return Entry::Vacant(VacantEntry {
                            table: self,
                            hash,
                            index,
                            displaces: false,
                        });
                    }
                } else {
                    if ctrl == tag
                        && slot_hash == hash
                        && eq(self
                            .slots_ptr()
                            .as_ref()
                            .get_unchecked(index)
                            .assume_init_ref())
                    {
                        return Entry::Occupied(OccupiedEntry { table: self, index });
                    }

                    if distance > existing {
                        return Entry::Vacant(VacantEntry {
                            table: self,
                            hash,
                            index,
                            displaces: true,
                        });
                    }
                }
            }

            index = (index + 1) & self.mask;
            distance += 1;
        }
    }

    /// Removes all elements from the table.
    ///
    /// Keeps the allocation: the control bytes reset to empty and all live
    /// values are dropped in place.
    pub fn clear(&mut self) {
        // SAFETY: occupied control bytes mark exactly the initialized slots;
        // the control region spans `[0, hashes_offset)`.
        unsafe {
            if core::mem::needs_drop::<V>() && self.populated > 0 {
                for index in 0..=self.mask {
                    if is_occupied(*self.ctrl_ptr().as_ref().get_unchecked(index)) {
                        self.slots_ptr()
                            .as_mut()
                            .get_unchecked_mut(index)
                            .assume_init_drop();
                    }
                }
            }

            core::ptr::write_bytes(self.alloc.as_ptr(), EMPTY, self.layout.hashes_offset);
        }

        self.populated = 0;
        self.tombstones = 0;
    }

    /// Returns an iterator over all values in the table.
    ///
    /// Values are visited in slot order, which is arbitrary from the
    /// caller's point of view and not preserved across mutations.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            table: self,
            index: 0,
        }
    }

    /// Returns an iterator that removes and yields all values from the
    /// table.
    ///
    /// Any values not yielded are removed and dropped when the iterator is
    /// dropped; afterwards the table is empty with its capacity intact.
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            index: 0,
        }
    }

    #[inline]
    fn maybe_grow(&mut self) {
        // Tombstones hold probe chains open just like live entries. Counting
        // them preserves the floor of empty slots that every walk's
        // termination rests on.
        if self.populated + self.tombstones >= self.load_limit {
            self.grow();
        }
    }

    #[cold]
    fn grow(&mut self) {
        let old_capacity = self.mask + 1;
        let new_capacity = old_capacity * 2;
        let new_layout = DataLayout::new::<V>(new_capacity);
        let new_alloc = allocate(&new_layout);

        let old_layout = core::mem::replace(&mut self.layout, new_layout);
        let old_alloc = core::mem::replace(&mut self.alloc, new_alloc);
        self.mask = new_capacity - 1;
        self.load_limit = load_limit(new_capacity);
        self.tombstones = 0;

        // SAFETY: the old allocation is live and laid out by `old_layout`,
        // and its occupied control bytes mark exactly the initialized slots.
        // Each surviving value is moved out once and re-seated from its
        // cached hash; tombstones are discarded. The old allocation is then
        // freed without dropping the moved-out values.
        unsafe {
            let old_ctrl: NonNull<[u8]> =
                NonNull::slice_from_raw_parts(old_alloc.cast(), old_capacity);
            let old_hashes: NonNull<[u64]> = NonNull::slice_from_raw_parts(
                old_alloc.add(old_layout.hashes_offset).cast(),
                old_capacity,
            );
            let old_slots: NonNull<[MaybeUninit<V>]> = NonNull::slice_from_raw_parts(
                old_alloc.add(old_layout.slots_offset).cast(),
                old_capacity,
            );

            for index in 0..old_capacity {
                if !is_occupied(*old_ctrl.as_ref().get_unchecked(index)) {
                    continue;
                }

                let hash = *old_hashes.as_ref().get_unchecked(index);
                let value = old_slots.as_ref().get_unchecked(index).assume_init_read();
                self.insert_unique(hash, value);
            }

            alloc::alloc::dealloc(old_alloc.as_ptr(), old_layout.layout);
        }
    }

    /// Re-seat an entry known to be absent into a table without tombstones.
    ///
    /// Used by growth, which carries `populated` over unchanged.
    ///
    /// # Safety
    ///
    /// The table must contain no tombstones and no entry equal to the one
    /// being inserted, and must have at least one empty slot.
    unsafe fn insert_unique(&mut self, hash: u64, value: V) {
        let mut index = self.home_index(hash);
        let mut pending_hash = hash;
        let mut pending = value;

        loop {
            // SAFETY: `index` is masked into range and occupied slots are
            // initialized.
            unsafe {
                let ctrl = *self.ctrl_ptr().as_ref().get_unchecked(index);
                if ctrl == EMPTY {
                    self.write_slot(index, pending_hash, pending);
                    return;
                }

                let slot_hash = *self.hashes_ptr().as_ref().get_unchecked(index);
                if self.probe_distance(pending_hash, index) > self.probe_distance(slot_hash, index)
                {
                    let slot = self.slots_ptr().as_mut().get_unchecked_mut(index);
                    let evicted = slot.assume_init_read();
                    slot.write(pending);
                    *self.hashes_ptr().as_mut().get_unchecked_mut(index) = pending_hash;
                    *self.ctrl_ptr().as_mut().get_unchecked_mut(index) =
                        control_tag(pending_hash);

                    pending = evicted;
                    pending_hash = slot_hash;
                }
            }

            index = (index + 1) & self.mask;
        }
    }

    /// Robin Hood displacement chain starting at an occupied slot the new
    /// entry has out-probed.
    ///
    /// The new entry lands at `start`; the evicted occupant is carried
    /// forward, evicting in turn until the chain is absorbed by an empty
    /// slot or a tombstone it has out-probed. Exactly one net entry is
    /// added.
    ///
    /// # Safety
    ///
    /// `start` must be an occupied slot whose occupant's probe distance is
    /// strictly smaller than `hash`'s walk distance at `start`, as
    /// established by the entry walk, and the table must not be at its load
    /// limit.
    unsafe fn insert_displacing(&mut self, start: usize, hash: u64, value: V) {
        let mut index = start;
        let mut pending_hash = hash;
        let mut pending = value;

        loop {
            // SAFETY: `index` is masked into range and occupied slots are
            // initialized.
            unsafe {
                let ctrl = *self.ctrl_ptr().as_ref().get_unchecked(index);
                if ctrl == EMPTY {
                    self.write_slot(index, pending_hash, pending);
                    self.populated += 1;
                    return;
                }

                let slot_hash = *self.hashes_ptr().as_ref().get_unchecked(index);
                let existing = self.probe_distance(slot_hash, index);
                let pending_distance = self.probe_distance(pending_hash, index);
                if ctrl == TOMBSTONE {
                    if pending_distance > existing {
                        self.tombstones -= 1;
                        self.write_slot(index, pending_hash, pending);
                        self.populated += 1;
                        return;
                    }
                } else if pending_distance > existing {
                    let slot = self.slots_ptr().as_mut().get_unchecked_mut(index);
                    let evicted = slot.assume_init_read();
                    slot.write(pending);
                    *self.hashes_ptr().as_mut().get_unchecked_mut(index) = pending_hash;
                    *self.ctrl_ptr().as_mut().get_unchecked_mut(index) =
                        control_tag(pending_hash);

                    pending = evicted;
                    pending_hash = slot_hash;
                }
            }

            index = (index + 1) & self.mask;
        }
    }

    /// Write an entry into a slot that holds no live value.
    ///
    /// # Safety
    ///
    /// `index` must be in range and its control byte must not be occupied.
    unsafe fn write_slot(&mut self, index: usize, hash: u64, value: V) {
        // SAFETY: caller guarantees `index` is in range and free.
        unsafe {
            *self.ctrl_ptr().as_mut().get_unchecked_mut(index) = control_tag(hash);
            *self.hashes_ptr().as_mut().get_unchecked_mut(index) = hash;
            self.slots_ptr()
                .as_mut()
                .get_unchecked_mut(index)
                .write(value);
        }
    }
}

/// A view into a single slot of a [`HashTable`], which is either occupied
/// or vacant.
pub enum Entry<'a, V> {
    /// The probed value is present.
    Occupied(OccupiedEntry<'a, V>),
    /// The probed value is absent.
    Vacant(VacantEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference to the value.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }
}

/// A view into an occupied slot in a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        // SAFETY: `index` addresses the occupied slot this entry was created
        // for, and the table cannot have been mutated since.
        unsafe {
            self.table
                .slots_ptr()
                .as_ref()
                .get_unchecked(self.index)
                .assume_init_ref()
        }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        // SAFETY: `index` addresses the occupied slot this entry was created
        // for, and the table cannot have been mutated since.
        unsafe {
            self.table
                .slots_ptr()
                .as_mut()
                .get_unchecked_mut(self.index)
                .assume_init_mut()
        }
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        // SAFETY: `index` addresses the occupied slot this entry was created
        // for, and the table cannot have been mutated since.
        unsafe {
            self.table
                .slots_ptr()
                .as_mut()
                .get_unchecked_mut(self.index)
                .assume_init_mut()
        }
    }

    /// Removes the entry from the table and returns its value, leaving a
    /// tombstone behind.
    pub fn remove(self) -> V {
        // SAFETY: `index` addresses the occupied slot this entry was created
        // for; the bookkeeping mirrors `HashTable::remove`.
        unsafe {
            *self
                .table
                .ctrl_ptr()
                .as_mut()
                .get_unchecked_mut(self.index) = TOMBSTONE;
            self.table.populated -= 1;
            self.table.tombstones += 1;

            self.table
                .slots_ptr()
                .as_ref()
                .get_unchecked(self.index)
                .assume_init_read()
        }
    }
}

/// A view into a vacant slot in a [`HashTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
    index: usize,
    displaces: bool,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts the value into the table and returns a mutable reference to
    /// it.
    pub fn insert(self, value: V) -> &'a mut V {
        let VacantEntry {
            table,
            hash,
            index,
            displaces,
        } = self;

        // SAFETY: the entry walk located `index` as a legal target for this
        // hash: a free slot, or the start of a displacement chain. The walk
        // ran after `maybe_grow`, so a free slot is always reachable.
        unsafe {
            if displaces {
                table.insert_displacing(index, hash, value);
            } else {
                if *table.ctrl_ptr().as_ref().get_unchecked(index) == TOMBSTONE {
                    table.tombstones -= 1;
                }
                table.write_slot(index, hash, value);
                table.populated += 1;
            }

            table
                .slots_ptr()
                .as_mut()
                .get_unchecked_mut(index)
                .assume_init_mut()
        }
    }
}

/// An iterator over the values of a [`HashTable`].
pub struct Iter<'a, V> {
    table: &'a HashTable<V>,
    index: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index <= self.table.mask {
            let index = self.index;
            self.index += 1;

            // SAFETY: `index` is in range and an occupied control byte marks
            // an initialized slot.
            unsafe {
                if is_occupied(*self.table.ctrl_ptr().as_ref().get_unchecked(index)) {
                    return Some(
                        self.table
                            .slots_ptr()
                            .as_ref()
                            .get_unchecked(index)
                            .assume_init_ref(),
                    );
                }
            }
        }

        None
    }
}

/// A draining iterator over the values of a [`HashTable`].
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> Iterator for Drain<'a, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index <= self.table.mask {
            let index = self.index;
            self.index += 1;

            // SAFETY: `index` is in range; each occupied slot is read out
            // exactly once because its control byte is cleared before the
            // value is yielded, keeping the table consistent even if the
            // iterator is leaked.
            unsafe {
                let ctrl = *self.table.ctrl_ptr().as_ref().get_unchecked(index);
                if ctrl == EMPTY {
                    continue;
                }

                *self.table.ctrl_ptr().as_mut().get_unchecked_mut(index) = EMPTY;
                if ctrl == TOMBSTONE {
                    self.table.tombstones -= 1;
                    continue;
                }

                self.table.populated -= 1;
                return Some(
                    self.table
                        .slots_ptr()
                        .as_ref()
                        .get_unchecked(index)
                        .assume_init_read(),
                );
            }
        }

        None
    }
}

impl<'a, V> Drop for Drain<'a, V> {
    fn drop(&mut self) {
        for _ in self {}
    }
}
