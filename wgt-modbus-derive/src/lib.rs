//! Macros to `derive` the `wgt-modbus` register traits

use proc_macro::TokenStream;
use quote::quote;

mod entry;
mod mapping;
mod utils;

/// Derive macro to implement `wgt_modbus::core::HoldingRegisterMap`.
///
/// Every field is read with its own request. Read-write fields also get an
/// inherent `update_<field>` method that writes a value, reads it back and stores it.
#[proc_macro_derive(HoldingRegisterMap, attributes(modbus))]
pub fn derive_holding_register_map(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    let name = &ast.ident;

    let mapping = mapping::Mapping::new(&ast);

    let field_name = mapping.field_name_vec();
    let field_ty = mapping.field_ty_vec();
    let x = mapping.x_vec();
    let addr = mapping.addr_vec();

    let writable = mapping.writable();
    let w_field_name = writable.field_name_vec();
    let w_field_ty = writable.field_ty_vec();
    let w_x = writable.x_vec();
    let w_addr = writable.addr_vec();
    let w_method = writable.update_method_vec();

    let tokens = quote! {
        #[wgt_modbus::async_trait]
        impl wgt_modbus::core::HoldingRegisterMap for #name {
            async fn update_from_holding_registers(
                &mut self,
                client: &mut dyn wgt_modbus::core::RegisterClient,
            ) -> wgt_modbus::Result<()> {
                #(
                    // Read
                    let word = client.read(#addr).await?;
                    // Decode and scale
                    self.#field_name = <#field_ty as wgt_modbus::codec::Decode>::from_word(word, #x);
                )*
                Ok(())
            }

            // Read-only maps leave `client` unused
            #[allow(unused_variables)]
            async fn write_to_registers(
                &self,
                client: &mut dyn wgt_modbus::core::RegisterClient,
            ) -> wgt_modbus::Result<()> {
                #(
                    // Rescale and encode
                    let word = wgt_modbus::codec::Encode::to_word(&self.#w_field_name, #w_x)?;
                    client.write(#w_addr, word).await?;
                )*
                Ok(())
            }
        }

        impl #name {
            #(
                /// Write `value`, read the register back and store what the device reports.
                pub async fn #w_method(
                    &mut self,
                    client: &mut dyn wgt_modbus::core::RegisterClient,
                    value: #w_field_ty,
                ) -> wgt_modbus::Result<#w_field_ty> {
                    let word = wgt_modbus::codec::Encode::to_word(&value, #w_x)?;
                    let word = client.update(#w_addr, word).await?;
                    self.#w_field_name = <#w_field_ty as wgt_modbus::codec::Decode>::from_word(word, #w_x);
                    Ok(self.#w_field_name)
                }
            )*
        }
    };

    tokens.into()
}

/// Attribute macro adding a doc line to every `modbus` field, e.g.
/// "address - `209`, scale factor - `0.1`, unit - `°C`, access - `r`."
#[proc_macro_attribute]
pub fn modbus_doc(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut ast = syn::parse_macro_input!(item as syn::DeriveInput);
    match &mut ast.data {
        syn::Data::Struct(ref mut struct_data) => {
            match &mut struct_data.fields {
                syn::Fields::Named(fields_named) => {
                    for field in &mut fields_named.named {
                        if field
                            .attrs
                            .iter()
                            .any(|attr| attr.path().is_ident("modbus"))
                        {
                            let entry: entry::Entry = field.clone().into();
                            let access = if entry.is_writable() { "rw" } else { "r" };
                            let doc = format!(
                                "address - `{}`, scale factor - `{}`, unit - `{}`, access - `{}`.",
                                entry.addr_string(),
                                entry.x,
                                entry.unit,
                                access
                            );
                            let doc: syn::Attribute = syn::parse_quote!(#[doc = #doc]);
                            field.attrs.push(doc);
                        }
                    }
                }
                _ => panic!("`modbus_doc` has to be applied to structs with named fields"),
            }

            quote! {
                #ast
            }
            .into()
        }
        _ => panic!("`modbus_doc` has to be applied with structs"),
    }
}

/// Derive macro to implement `wgt_modbus::simulator::HoldingRegisterModel`
#[proc_macro_derive(HoldingRegisterModel, attributes(modbus))]
pub fn derive_holding_register_model(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    let name = &ast.ident;

    let mapping = mapping::Mapping::new(&ast);

    let field_name = mapping.field_name_vec();
    let field_ty = mapping.field_ty_vec();
    let x = mapping.x_vec();
    let addr = mapping.addr_vec();

    let tokens = quote! {
        impl wgt_modbus::simulator::HoldingRegisterModel for #name {
            fn new_registers(&self) -> wgt_modbus::simulator::Registers {
                let mut registers = wgt_modbus::simulator::Registers::default();

                #(
                    // Values out of range start as zero
                    let word = wgt_modbus::codec::Encode::to_word(&self.#field_name, #x).unwrap_or_default();
                    registers.insert(#addr, &[word]);
                )*

                registers
            }

            fn update_registers(
                &self,
                registers: &mut wgt_modbus::simulator::Registers,
            ) -> ::std::result::Result<(), wgt_modbus::simulator::ExceptionCode> {
                #(
                    let word = wgt_modbus::codec::Encode::to_word(&self.#field_name, #x)
                        .map_err(|_| wgt_modbus::simulator::ExceptionCode::IllegalDataValue)?;
                    registers.write(#addr, &[word])?;
                )*

                Ok(())
            }

            fn update_self(
                &mut self,
                registers: &wgt_modbus::simulator::Registers,
            ) -> ::std::result::Result<(), wgt_modbus::simulator::ExceptionCode> {
                #(
                    let word = registers
                        .get(#addr)
                        .ok_or(wgt_modbus::simulator::ExceptionCode::IllegalDataAddress)?;
                    self.#field_name = <#field_ty as wgt_modbus::codec::Decode>::from_word(word, #x);
                )*

                Ok(())
            }
        }
    };

    tokens.into()
}
