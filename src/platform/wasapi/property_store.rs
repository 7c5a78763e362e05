//! `IPropertyStore` reads.

use crate::audio::{AudioError, PropertyKey, PropertyStore, PropertyValue};
use windows::core::GUID;
use windows::Win32::UI::Shell::PropertiesSystem::{IPropertyStore, PROPERTYKEY};

pub struct WasapiPropertyStore {
    store: IPropertyStore,
}

impl WasapiPropertyStore {
    pub fn new(store: IPropertyStore) -> Self {
        Self { store }
    }
}

impl PropertyStore for WasapiPropertyStore {
    fn get_value(&self, key: &PropertyKey) -> Result<PropertyValue, AudioError> {
        let native_key = PROPERTYKEY {
            fmtid: GUID::from_u128(key.fmtid),
            pid: key.pid,
        };

        unsafe {
            // PROPVARIANT calls PropVariantClear when dropped, so the variant
            // is released on every path out of this block.
            let value = self
                .store
                .GetValue(&native_key as *const _)
                .map_err(|_| AudioError::PropertyUnavailable {
                    key: key.to_string(),
                })?;

            let s = value.to_string();
            if s.is_empty() {
                Ok(PropertyValue::Empty)
            } else {
                Ok(PropertyValue::String(s))
            }
        }
    }
}
