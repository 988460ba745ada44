// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

pub trait IndexMarkerName: Copy {
    const NAME: &'static str;
}

/// Dense index newtype. Instances are index-based (the file format refers
/// to everything by position), so ids double as array indices.
#[repr(transparent)]
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index<U>(usize, core::marker::PhantomData<U>);

impl<U> Index<U> {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index, core::marker::PhantomData)
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl<U: IndexMarkerName> std::fmt::Display for Index<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", U::NAME, self.0)
    }
}

impl<U> From<usize> for Index<U> {
    #[inline]
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdMarker;

impl IndexMarkerName for ResourceIdMarker {
    const NAME: &'static str = "ResourceId";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MachineIdMarker;

impl IndexMarkerName for MachineIdMarker {
    const NAME: &'static str = "MachineId";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceIdMarker;

impl IndexMarkerName for ServiceIdMarker {
    const NAME: &'static str = "ServiceId";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessIdMarker;

impl IndexMarkerName for ProcessIdMarker {
    const NAME: &'static str = "ProcessId";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationIdMarker;

impl IndexMarkerName for LocationIdMarker {
    const NAME: &'static str = "LocationId";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NeighborhoodIdMarker;

impl IndexMarkerName for NeighborhoodIdMarker {
    const NAME: &'static str = "NeighborhoodId";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BalanceIdMarker;

impl IndexMarkerName for BalanceIdMarker {
    const NAME: &'static str = "BalanceId";
}

pub type ResourceId = Index<ResourceIdMarker>;
pub type MachineId = Index<MachineIdMarker>;
pub type ServiceId = Index<ServiceIdMarker>;
pub type ProcessId = Index<ProcessIdMarker>;
pub type LocationId = Index<LocationIdMarker>;
pub type NeighborhoodId = Index<NeighborhoodIdMarker>;
pub type BalanceId = Index<BalanceIdMarker>;
