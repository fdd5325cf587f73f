use crate::entry::{Entry, ScaleFactor};
use proc_macro2::{Ident, TokenStream};
use std::collections::HashSet;
use syn::{Data, DeriveInput, Fields};

#[derive(Debug, Clone)]
pub struct Mapping(pub Vec<Entry>);

impl Mapping {
    pub fn new(ast: &DeriveInput) -> Self {
        let data_struct = match ast.data.clone() {
            Data::Struct(data_struct) => data_struct,
            _ => panic!("Trait can be implemented only for a struct."),
        };

        let named_fields = match data_struct.fields {
            Fields::Named(fields_named) => fields_named.named,
            _ => panic!("Trait can be implemented only for a struct with named fields."),
        };
        let map: Vec<Entry> = named_fields
            .into_iter()
            .filter(|field| {
                field
                    .attrs
                    .iter()
                    .any(|attr| attr.path().is_ident("modbus"))
            })
            .map(From::from)
            .collect::<Vec<_>>();

        let mapping = Self(map);
        mapping.check_unique_addresses();
        mapping
    }

    /// Mapping restricted to read-write entries.
    pub fn writable(&self) -> Self {
        Self(
            self.0
                .iter()
                .filter(|entry| entry.is_writable())
                .cloned()
                .collect(),
        )
    }

    pub fn field_name_vec(&self) -> Vec<Ident> {
        self.0
            .iter()
            .map(|x| x.field_name_ident())
            .collect::<Vec<_>>()
    }

    pub fn field_ty_vec(&self) -> Vec<Ident> {
        self.0
            .iter()
            .map(|x| x.field_ty_ident())
            .collect::<Vec<_>>()
    }

    pub fn addr_vec(&self) -> Vec<TokenStream> {
        self.0.iter().map(|x| x.addr_tokens()).collect::<Vec<_>>()
    }

    pub fn x_vec(&self) -> Vec<ScaleFactor> {
        self.0.iter().map(|x| x.x).collect::<Vec<_>>()
    }

    pub fn update_method_vec(&self) -> Vec<Ident> {
        self.0
            .iter()
            .map(|x| x.update_method_ident())
            .collect::<Vec<_>>()
    }

    // Addresses spelled the same way must not be mapped twice.
    fn check_unique_addresses(&self) {
        let mut seen = HashSet::new();
        for entry in &self.0 {
            let addr = entry.addr_string();
            if !seen.insert(addr.clone()) {
                panic!(
                    "Address `{addr}` of `{}` field is already mapped.",
                    entry.field_name
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn keeps_declaration_order_and_skips_plain_fields() {
        let ast: DeriveInput = parse_quote! {
            struct Registers {
                #[modbus(addr = 209, x = 0.1, access = "r")]
                outside_temperature: f64,
                cache: Vec<u8>,
                #[modbus(addr = 100)]
                operating_mode: OperatingMode,
            }
        };
        let mapping = Mapping::new(&ast);
        let names = mapping
            .field_name_vec()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["outside_temperature", "operating_mode"]);
        assert_eq!(mapping.x_vec(), vec![0.1, 1.0]);

        let writable = mapping.writable();
        assert_eq!(writable.0.len(), 1);
        assert_eq!(writable.0[0].field_name, "operating_mode");
    }

    #[test]
    #[should_panic(expected = "is already mapped")]
    fn duplicate_address_panics() {
        let ast: DeriveInput = parse_quote! {
            struct Registers {
                #[modbus(addr = 100)]
                a: i16,
                #[modbus(addr = 100)]
                b: i16,
            }
        };
        let _ = Mapping::new(&ast);
    }
}
