//! `msp` package: MSP configuration, principals and serialized identities.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MspConfig {
    #[prost(int32, tag = "1")]
    pub r#type: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub config: Vec<u8>,
}

/// `MSPConfig.type` for an X.509 based Fabric MSP.
pub const FABRIC_MSP_TYPE: i32 = 0;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FabricMspConfig {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub root_certs: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub intermediate_certs: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "4")]
    pub admins: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "5")]
    pub revocation_list: Vec<Vec<u8>>,
    #[prost(message, optional, tag = "6")]
    pub signing_identity: ::core::option::Option<SigningIdentityInfo>,
    #[prost(message, repeated, tag = "7")]
    pub organizational_unit_identifiers: Vec<FabricOuIdentifier>,
    #[prost(message, optional, tag = "8")]
    pub crypto_config: ::core::option::Option<FabricCryptoConfig>,
    #[prost(bytes = "vec", repeated, tag = "9")]
    pub tls_root_certs: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "10")]
    pub tls_intermediate_certs: Vec<Vec<u8>>,
    #[prost(message, optional, tag = "11")]
    pub fabric_node_ous: ::core::option::Option<FabricNodeOUs>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FabricCryptoConfig {
    #[prost(string, tag = "1")]
    pub signature_hash_family: String,
    #[prost(string, tag = "2")]
    pub identity_identifier_hash_function: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SigningIdentityInfo {
    #[prost(bytes = "vec", tag = "1")]
    pub public_signer: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub private_signer: ::core::option::Option<KeyInfo>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyInfo {
    #[prost(string, tag = "1")]
    pub key_identifier: String,
    #[prost(bytes = "vec", tag = "2")]
    pub key_material: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FabricOuIdentifier {
    #[prost(bytes = "vec", tag = "1")]
    pub certificate: Vec<u8>,
    #[prost(string, tag = "2")]
    pub organizational_unit_identifier: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FabricNodeOUs {
    #[prost(bool, tag = "1")]
    pub enable: bool,
    #[prost(message, optional, tag = "2")]
    pub client_ou_identifier: ::core::option::Option<FabricOuIdentifier>,
    #[prost(message, optional, tag = "3")]
    pub peer_ou_identifier: ::core::option::Option<FabricOuIdentifier>,
    #[prost(message, optional, tag = "4")]
    pub admin_ou_identifier: ::core::option::Option<FabricOuIdentifier>,
    #[prost(message, optional, tag = "5")]
    pub orderer_ou_identifier: ::core::option::Option<FabricOuIdentifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SerializedIdentity {
    #[prost(string, tag = "1")]
    pub mspid: String,
    #[prost(bytes = "vec", tag = "2")]
    pub id_bytes: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MspPrincipal {
    #[prost(enumeration = "msp_principal::Classification", tag = "1")]
    pub principal_classification: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub principal: Vec<u8>,
}

pub mod msp_principal {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Classification {
        Role = 0,
        OrganizationUnit = 1,
        Identity = 2,
        Anonymity = 3,
        Combined = 4,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MspRole {
    #[prost(string, tag = "1")]
    pub msp_identifier: String,
    #[prost(enumeration = "msp_role::MspRoleType", tag = "2")]
    pub role: i32,
}

pub mod msp_role {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum MspRoleType {
        Member = 0,
        Admin = 1,
        Client = 2,
        Peer = 3,
        Orderer = 4,
    }
}
