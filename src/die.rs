//! The debugging-information-entry tree.

use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

use crate::attr::AttrValue;
use crate::constants;
use crate::unit::UnitHeader;

/// An attribute of a DIE: a name and its decoded value.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: constants::DwAt,
    value: AttrValue,
}

impl Attribute {
    pub(crate) fn new(name: constants::DwAt, value: AttrValue) -> Attribute {
        Attribute { name, value }
    }

    /// Get this attribute's name.
    #[inline]
    pub fn name(&self) -> constants::DwAt {
        self.name
    }

    /// Get this attribute's value.
    #[inline]
    pub fn value(&self) -> &AttrValue {
        &self.value
    }
}

/// A debugging information entry: one node of a unit's DIE tree.
///
/// Nodes are handed out as `Rc<Die>`. The container's offset→DIE cache
/// holds the owning handles; a node owns its children, links to its
/// parent weakly, and is uniquely identified by its byte offset in
/// `.debug_info`. Looking the same offset up twice yields the same node,
/// so handles may be compared with `Rc::ptr_eq`.
#[derive(Debug)]
pub struct Die {
    tag: constants::DwTag,
    offset: u64,
    end_offset: Cell<u64>,
    unit: Rc<UnitHeader>,
    parent: RefCell<Weak<Die>>,
    attrs: RefCell<Vec<Attribute>>,
    children: RefCell<Vec<Rc<Die>>>,
}

impl Die {
    pub(crate) fn new(
        tag: constants::DwTag,
        offset: u64,
        unit: Rc<UnitHeader>,
        parent: Weak<Die>,
    ) -> Rc<Die> {
        Rc::new(Die {
            tag,
            offset,
            end_offset: Cell::new(0),
            unit,
            parent: RefCell::new(parent),
            attrs: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
        })
    }

    /// Get this DIE's tag.
    #[inline]
    pub fn tag(&self) -> constants::DwTag {
        self.tag
    }

    /// The offset in `.debug_info` at which this DIE begins.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The offset in `.debug_info` one past this DIE's last byte,
    /// including the null entry that terminates its child list if it has
    /// children.
    #[inline]
    pub fn end_offset(&self) -> u64 {
        self.end_offset.get()
    }

    /// The header of the unit this DIE belongs to.
    #[inline]
    pub fn unit(&self) -> &UnitHeader {
        &self.unit
    }

    /// This DIE's parent, or `None` for a unit's root.
    pub fn parent(&self) -> Option<Rc<Die>> {
        self.parent.borrow().upgrade()
    }

    /// This DIE's children, in source byte order.
    pub fn children(&self) -> Ref<Vec<Rc<Die>>> {
        self.children.borrow()
    }

    /// The number of children.
    pub fn num_children(&self) -> usize {
        self.children.borrow().len()
    }

    /// The child at the given index.
    pub fn child(&self, index: usize) -> Option<Rc<Die>> {
        self.children.borrow().get(index).cloned()
    }

    /// This DIE's attributes, in declaration order.
    pub fn attributes(&self) -> Ref<Vec<Attribute>> {
        self.attrs.borrow()
    }

    /// The number of attributes.
    pub fn num_attributes(&self) -> usize {
        self.attrs.borrow().len()
    }

    /// Look an attribute up by name. Attribute names are unique within
    /// one DIE.
    pub fn attr(&self, name: constants::DwAt) -> Option<Attribute> {
        self.attrs
            .borrow()
            .iter()
            .find(|attr| attr.name() == name)
            .cloned()
    }

    /// Look an attribute's value up by name.
    pub fn attr_value(&self, name: constants::DwAt) -> Option<AttrValue> {
        self.attr(name).map(|attr| attr.value)
    }

    pub(crate) fn set_parent(&self, parent: &Rc<Die>) {
        *self.parent.borrow_mut() = Rc::downgrade(parent);
    }

    pub(crate) fn push_attr(&self, attr: Attribute) {
        self.attrs.borrow_mut().push(attr);
    }

    pub(crate) fn push_child(&self, child: Rc<Die>) {
        self.children.borrow_mut().push(child);
    }

    pub(crate) fn set_end_offset(&self, end_offset: u64) {
        self.end_offset.set(end_offset);
    }
}

/// A non-owning reference from an attribute to another DIE.
///
/// The reference keeps the target's `.debug_info` offset and a weak
/// handle into the container's cache; it never owns the target, so
/// mutually referential type DIEs do not form ownership cycles. Two
/// references are equal when they name the same target offset.
#[derive(Debug, Clone)]
pub struct DieRef {
    offset: u64,
    target: Weak<Die>,
}

impl DieRef {
    pub(crate) fn new(target: &Rc<Die>) -> DieRef {
        DieRef {
            offset: target.offset(),
            target: Rc::downgrade(target),
        }
    }

    /// The `.debug_info` offset of the referenced DIE.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Resolve the reference to its node.
    ///
    /// Returns `None` only if the owning container has been dropped.
    pub fn resolve(&self) -> Option<Rc<Die>> {
        self.target.upgrade()
    }
}

impl PartialEq for DieRef {
    fn eq(&self, other: &DieRef) -> bool {
        self.offset == other.offset
    }
}

impl Eq for DieRef {}
