//! Description of the generic type `Prefix`.

#[cfg(feature = "ipnet")]
use ipnet::Ipv4Net;
#[cfg(feature = "ipnetwork")]
use ipnetwork::Ipv4Network;
use num_traits::{PrimInt, Unsigned, Zero};
#[cfg(any(feature = "ipnet", feature = "ipnetwork"))]
use std::net::Ipv4Addr;

use crate::PrefixError;

/// Trait for defining prefixes stored in an [`crate::LpmTrie`].
pub trait Prefix: Sized {
    /// How the address is represented. The trie is built for `u32`, but any unsigned primitive
    /// integer works, as all bit operations are generic over its width.
    type R: Unsigned + PrimInt;

    /// Get raw representation of the address, ignoring the prefix length.
    fn repr(&self) -> Self::R;

    /// Prefix length
    fn prefix_len(&self) -> u8;

    /// Create a new prefix from the representation and the prefix length. The caller guarantees
    /// that `len` does not exceed the address width. Use [`Prefix::try_new`] for untrusted input.
    fn from_repr_len(repr: Self::R, len: u8) -> Self;

    /// Create a new prefix, rejecting lengths larger than the address width and addresses with
    /// bits set after the first `len` bits.
    ///
    /// ```
    /// # use lpm_trie::*;
    /// assert_eq!(<(u32, u8)>::try_new(0x0a000000, 8), Ok((0x0a000000, 8)));
    /// assert_eq!(
    ///     <(u32, u8)>::try_new(0x0a000000, 33),
    ///     Err(PrefixError::LengthOutOfRange { len: 33, width: 32 })
    /// );
    /// assert_eq!(
    ///     <(u32, u8)>::try_new(0x0a010000, 8),
    ///     Err(PrefixError::HostBitsSet { len: 8 })
    /// );
    /// ```
    fn try_new(repr: Self::R, len: u8) -> Result<Self, PrefixError> {
        let width = address_width::<Self::R>();
        if len > width {
            return Err(PrefixError::LengthOutOfRange { len, width });
        }
        if repr & !mask_from_prefix_len::<Self::R>(len) != Self::R::zero() {
            return Err(PrefixError::HostBitsSet { len });
        }
        Ok(Self::from_repr_len(repr, len))
    }

    /// mask `self.repr()` using `self.prefix_len()`. Re-implement this if the representation is
    /// already masked.
    fn mask(&self) -> Self::R {
        self.repr() & mask_from_prefix_len(self.prefix_len())
    }

    /// Create a prefix that matches everything
    fn zero() -> Self {
        Self::from_repr_len(Self::R::zero(), 0)
    }

    /// The longest prefix that contains both `self` and `other`.
    fn supernet(&self, other: &Self) -> Self {
        let a = self.mask();
        let b = other.mask();
        let len = ((a ^ b).leading_zeros() as u8)
            .min(self.prefix_len())
            .min(other.prefix_len());
        Self::from_repr_len(a & mask_from_prefix_len(len), len)
    }

    /// Check if `self` contains `other` in its prefix range. This function also returns `true` if
    /// `self` is identical to `other`.
    fn contains(&self, other: &Self) -> bool {
        if self.prefix_len() > other.prefix_len() {
            return false;
        }
        other.repr() & mask_from_prefix_len(self.prefix_len()) == self.mask()
    }

    /// Check if a specific bit is set (counted from the left, where 0 is the first bit from the
    /// left). Bits after the prefix length are never set.
    fn is_bit_set(&self, bit: u8) -> bool {
        bit_at(self.mask(), bit)
    }

    /// Compare two prefixes together
    fn eq(&self, other: &Self) -> bool {
        self.mask() == other.mask() && self.prefix_len() == other.prefix_len()
    }
}

/// Number of bits in the representation `R`.
pub fn address_width<R: PrimInt>() -> u8 {
    R::zero().count_zeros() as u8
}

/// Value of bit `pos` of `addr`, counted from the most significant bit. Positions at or beyond the
/// width of `R` read as unset.
pub fn bit_at<R: PrimInt>(addr: R, pos: u8) -> bool {
    let width = address_width::<R>();
    if pos >= width {
        return false;
    }
    (addr >> (width - 1 - pos) as usize) & R::one() == R::one()
}

/// Netmask with the first `len` bits set.
pub fn mask_from_prefix_len<R: PrimInt>(len: u8) -> R {
    let width = address_width::<R>();
    if len >= width {
        !R::zero()
    } else if len == 0 {
        R::zero()
    } else {
        !((!R::zero()) >> len as usize)
    }
}

#[cfg(feature = "ipnet")]
impl Prefix for Ipv4Net {
    type R = u32;

    fn repr(&self) -> u32 {
        self.addr().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }

    fn from_repr_len(repr: u32, len: u8) -> Self {
        Ipv4Net::new(Ipv4Addr::from(repr), len.min(32))
            .map(|net| net.trunc())
            .unwrap_or_default()
    }

    fn eq(&self, other: &Self) -> bool {
        self.trunc() == other.trunc()
    }

    fn mask(&self) -> u32 {
        self.network().into()
    }

    fn zero() -> Self {
        Default::default()
    }
}

#[cfg(feature = "ipnetwork")]
impl Prefix for Ipv4Network {
    type R = u32;

    fn repr(&self) -> u32 {
        self.ip().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }

    fn from_repr_len(repr: u32, len: u8) -> Self {
        let len = len.min(32);
        let addr = Ipv4Addr::from(repr & mask_from_prefix_len::<u32>(len));
        Ipv4Network::new(addr, len).unwrap_or_else(|_| Ipv4Network::from(addr))
    }

    fn eq(&self, other: &Self) -> bool {
        self.network() == other.network() && self.prefix() == other.prefix()
    }

    fn mask(&self) -> u32 {
        self.network().into()
    }
}

impl<R> Prefix for (R, u8)
where
    R: Unsigned + PrimInt,
{
    type R = R;

    fn repr(&self) -> R {
        self.0
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }

    fn from_repr_len(repr: R, len: u8) -> Self {
        (repr, len)
    }

    fn eq(&self, other: &Self) -> bool {
        self == other
    }
}
