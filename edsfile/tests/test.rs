#[cfg(test)]
mod test {
    use edsfile::*;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    const TEST_EDS: &str = r#"
; generated by a configuration tool
[FileInfo]
FileName=widget.eds
FileVersion=1
FileRevision=7
EDSVersion=4.0
Description=Test device
CreatedBy=ACME

[DeviceInfo]
VendorName=ACME
VendorNumber=0x00000123
ProductName=Widget
ProductNumber=0x1
RevisionNumber=0x00010002
BaudRate_250=1
BaudRate_500=1
SimpleBootUpSlave=1
Granularity=8
NrOfRXPDO=1
NrOfTXPDO=1
LSS_Supported=1

[DummyUsage]
Dummy0005=1

[MandatoryObjects]
SupportedObjects=2
1=0x1000
2=0x1018

[OptionalObjects]
SupportedObjects=2
1=0x1400
2=0x1600

[ManufacturerObjects]
SupportedObjects=1
1=0x2000

[1000]
ParameterName=Device Type
ObjectType=0x7
DataType=0x0007
AccessType=ro
DefaultValue=0x00000191
PDOMapping=0

[1018]
ParameterName=Identity Object
ObjectType=0x9
SubNumber=3

[1018sub0]
ParameterName=Highest sub-index supported
ObjectType=0x7
DataType=0x0005
AccessType=ro
DefaultValue=2

[1018sub1]
ParameterName=Vendor-ID
ObjectType=0x7
DataType=0x0007
AccessType=ro
DefaultValue=0x00000123

[1018sub2]
ParameterName=Product code
ObjectType=0x7
DataType=0x0007
AccessType=ro
DefaultValue=0x00000001

[1400]
ParameterName=RPDO communication parameter
ObjectType=0x9
SubNumber=2

[1400sub0]
ParameterName=Highest sub-index supported
ObjectType=0x7
DataType=0x0005
AccessType=const
DefaultValue=1

[1400sub1]
ParameterName=COB-ID
ObjectType=0x7
DataType=0x0007
AccessType=rw
DefaultValue=$NODEID+0x200

[1600]
ParameterName=RPDO mapping parameter
ObjectType=0x8
DataType=0x0007
AccessType=rw
CompactSubObj=2

[2000]
ParameterName=Setpoint
ObjectType=0x7
DataType=0x0006
AccessType=rww
LowLimit=0
HighLimit=1000
DefaultValue=100
PDOMapping=1

[2000ObjectLinks]
ObjectLinks=1
1=0x1000

[VendorExtension]
Format=2
Mode=fast
"#;

    fn load_test_eds() -> ElectronicDataSheet {
        load_eds_from_string(TEST_EDS, &LoadOptions::default()).unwrap()
    }

    // all (section, key, value) triples of a section map, with case-normalized section names
    fn triples(sections: &SectionMap) -> BTreeSet<(String, String, String)> {
        sections
            .iter()
            .flat_map(|section| {
                section.iter().map(|(key, value)| {
                    (
                        section.name().to_ascii_lowercase(),
                        key.to_ascii_lowercase(),
                        value.to_string(),
                    )
                })
            })
            .collect()
    }

    #[test]
    fn end_to_end_device_type() {
        let text = r#"
[DeviceInfo]
VendorName=ACME

[1000]
ParameterName=Device Type
AccessType=ro
DefaultValue=0x00000191
"#;
        let eds = load_eds_from_string(text, &LoadOptions::default()).unwrap();
        assert_eq!(eds.object_dictionary.objects.len(), 1);
        let entry = &eds.object_dictionary.objects[&0x1000];
        assert_eq!(entry.index, 0x1000);
        assert_eq!(entry.parameter_name, "Device Type");
        assert_eq!(entry.access_type, AccessType::ReadOnly);
        assert_eq!(entry.default_value.as_deref(), Some("0x00000191"));

        let output = eds.write_to_string();
        assert!(output.contains("[1000]\n"));
        assert!(output.contains("AccessType=ro\n"));
        assert!(output.contains("DefaultValue=0x00000191\n"));
        assert!(!output.contains("LowLimit"));
        assert!(!output.contains("HighLimit"));
    }

    #[test]
    fn parse_complete_eds() {
        let eds = load_test_eds();
        assert_eq!(eds.file_info.file_revision, 7);
        assert_eq!(eds.device_info.vendor_number, 0x123);
        assert!(eds.device_info.baud_rates.supports(250));
        assert!(!eds.device_info.baud_rates.supports(1000));
        assert_eq!(eds.object_dictionary.dummy_usage.get(&5), Some(&true));

        let od = &eds.object_dictionary;
        assert_eq!(od.mandatory_objects, vec![0x1000, 0x1018]);
        assert_eq!(od.objects.len(), 5);
        assert_eq!(od.objects[&0x1018].sub_objects.len(), 3);
        assert_eq!(od.objects[&0x1018].object_type, ObjectCode::Record);
        assert_eq!(od.objects[&0x1600].compact_sub_obj, Some(2));
        assert_eq!(od.objects[&0x2000].access_type, AccessType::ReadWriteOutput);
        assert_eq!(od.objects[&0x2000].object_links, vec![0x1000]);

        // node id formulas are not evaluated in an EDS
        assert_eq!(
            od.get_sub_object(0x1400, 1).unwrap().default_value.as_deref(),
            Some("$NODEID+0x200")
        );
        assert!(matches!(
            od.evaluate_value(0x1400, Some(1), None),
            Err(LiteralError::UnresolvedNodeId { .. })
        ));
        assert_eq!(od.evaluate_value(0x1400, Some(1), Some(4)), Ok(Some(0x204)));

        let names: Vec<&str> = eds.additional_sections.names().collect();
        assert_eq!(names, vec!["2000ObjectLinks", "VendorExtension"]);
    }

    #[test]
    fn partition_invariant() {
        let sections = load_sections_from_string(TEST_EDS, &LoadOptions::default()).unwrap();
        let eds = load_test_eds();

        for section in &sections {
            let in_bag = eds.additional_sections.contains(section.name());
            let class = classify_section(section.name(), FileVariant::Eds);
            match class {
                SectionClass::Known(_) => assert!(!in_bag, "[{}]", section.name()),
                SectionClass::ObjectLinks(_) | SectionClass::Unknown => {
                    assert!(in_bag, "[{}]", section.name());
                }
            }
        }
        for section in &eds.additional_sections {
            assert!(sections.contains(section.name()));
        }
    }

    #[test]
    fn round_trip_eds() {
        let eds = load_test_eds();
        let text = eds.write_to_string();
        let reloaded = load_eds_from_string(&text, &LoadOptions::default()).unwrap();

        assert_eq!(reloaded.file_info, eds.file_info);
        assert_eq!(reloaded.device_info, eds.device_info);
        assert_eq!(reloaded.object_dictionary, eds.object_dictionary);
        assert_eq!(reloaded.comments, eds.comments);
        assert_eq!(reloaded.supported_modules, eds.supported_modules);
        assert_eq!(
            triples(&reloaded.additional_sections),
            triples(&eds.additional_sections)
        );

        // writing is deterministic
        assert_eq!(reloaded.write_to_string(), text);
    }

    const TEST_DCF: &str = r#"
[FileInfo]
FileName=widget.dcf
FileVersion=1
FileRevision=8
LastEDS=widget.eds

[DeviceInfo]
VendorName=ACME
VendorNumber=0x00000123
ProductName=Widget
DynamicChannelsSupported=1

[DeviceCommissioning]
NodeID=0x05
NodeName=Widget_Node5
Baudrate=500
NetNumber=1
NetworkName=Line 1
CANopenManager=0

[MandatoryObjects]
SupportedObjects=1
1=0x1000

[OptionalObjects]
SupportedObjects=2
1=0x1014
2=0x1600

[ManufacturerObjects]
SupportedObjects=1
1=0x2000

[1000]
ParameterName=Device type
ObjectType=0x7
DataType=0x0007
AccessType=ro
DefaultValue=0x00000191
PDOMapping=0
ParameterValue=0x00000191

[1014]
ParameterName=COB-ID EMCY
ObjectType=0x7
DataType=0x0007
AccessType=rw
DefaultValue=$NODEID+0x80
PDOMapping=0

[1600]
ParameterName=RPDO mapping parameter
ObjectType=0x8
DataType=0x0007
AccessType=rw
SubNumber=3

[1600sub0]
ParameterName=Number of entries
DataType=0x0005
AccessType=rw
DefaultValue=2

[1600sub1]
ParameterName=Mapping 1
DataType=0x0007
AccessType=rw
DefaultValue=0

[1600sub2]
ParameterName=Mapping 2
DataType=0x0007
AccessType=rw
DefaultValue=0

[1600Value]
NrOfEntries=2
1=0x60000108
2=0x60000208

[1600Denotation]
NrOfEntries=1
1=Inputs

[2000]
ParameterName=Speed
ObjectType=0x7
DataType=0x0006
AccessType=rww
PDOMapping=1
ParameterValue=$NODEID+100

[2000ObjectLinks]
ObjectLinks=1
1=0x1000

[SupportedModules]
NrOfEntries=1

[M1ModuleInfo]
ProductName=Input module
ProductVersion=2
ProductRevision=1
OrderCode=IN-8

[M1FixedObjects]
NrOfEntries=1
1=0x6000

[M1Fixed6000]
ParameterName=Inputs
ObjectType=0x7
DataType=0x0005
AccessType=ro

[M1SubExtends]
NrOfEntries=1
1=0x6100

[M1SubExt6100]
ParameterName=Extra inputs
DataType=0x0005
AccessType=ro
Count=2

[M1SubExtFoo]
Layout=compact

[ConnectedModules]
NrOfEntries=2
1=1
2=1

[DynamicChannels]
NrOfSeg=1
Type1=0x0007
Dir1=rww
Range1=0xA080-0xA0BF
PPOffset1=0

[Tools]
Items=1

[Tool1]
Name=Configurator
Command=conf.exe $DCF

[VendorSpecific]
Mode=fast
"#;

    #[test]
    fn round_trip_dcf() {
        let dcf = load_dcf_from_string(TEST_DCF, &LoadOptions::default()).unwrap();
        assert_eq!(dcf.device_commissioning.node_id, 5);
        assert_eq!(dcf.connected_modules, vec![1, 1]);
        assert_eq!(dcf.resolved_value(0x1014, None), Ok(Some(0x85)));
        assert_eq!(dcf.resolved_value(0x2000, None), Ok(Some(105)));
        let mapping = dcf.object_dictionary.get_sub_object(0x1600, 1).unwrap();
        assert_eq!(mapping.parameter_value.as_deref(), Some("0x60000108"));
        assert_eq!(mapping.denotation.as_deref(), Some("Inputs"));

        let text = dcf.write_to_string();
        // compact storage is written out as ParameterValue/Denotation of the sub-objects
        assert!(!text.contains("[1600Value]"));
        assert!(!text.contains("[1600Denotation]"));
        assert!(text.contains("ParameterValue=0x60000208\n"));
        assert_eq!(text.matches("[2000ObjectLinks]").count(), 1);

        let reloaded = load_dcf_from_string(&text, &LoadOptions::default()).unwrap();
        assert_eq!(reloaded.file_info, dcf.file_info);
        assert_eq!(reloaded.device_info, dcf.device_info);
        assert_eq!(reloaded.device_commissioning, dcf.device_commissioning);
        assert_eq!(reloaded.object_dictionary, dcf.object_dictionary);
        assert_eq!(reloaded.comments, dcf.comments);
        assert_eq!(reloaded.supported_modules, dcf.supported_modules);
        assert_eq!(reloaded.connected_modules, dcf.connected_modules);
        assert_eq!(reloaded.dynamic_channels, dcf.dynamic_channels);
        assert_eq!(reloaded.tools, dcf.tools);
        assert_eq!(
            triples(&reloaded.additional_sections),
            triples(&dcf.additional_sections)
        );
        let names: Vec<&str> = reloaded.additional_sections.names().collect();
        assert_eq!(
            names,
            vec!["2000ObjectLinks", "M1SubExtFoo", "VendorSpecific"]
        );

        assert_eq!(reloaded.write_to_string(), text);
    }

    #[test]
    fn object_links_written_once() {
        let eds = load_test_eds();
        let text = eds.write_to_string();
        assert_eq!(text.matches("[2000ObjectLinks]").count(), 1);

        // links that were changed in the tree win over the stale copy in the additional sections
        let mut modified = eds.clone();
        modified
            .object_dictionary
            .get_object_mut(0x2000)
            .unwrap()
            .object_links = vec![0x1018, 0x1400];
        let text = modified.write_to_string();
        assert_eq!(text.matches("[2000ObjectLinks]").count(), 1);
        assert!(text.contains("[2000ObjectLinks]\nObjectLinks=2\n1=0x1018\n2=0x1400\n"));

        // orphaned links are passed through
        let mut orphan = eds.clone();
        orphan.object_dictionary.objects.remove(&0x2000);
        let text = orphan.write_to_string();
        assert_eq!(text.matches("[2000ObjectLinks]").count(), 1);
        assert!(text.contains("[2000ObjectLinks]\nObjectLinks=1\n1=0x1000\n"));
    }

    #[test]
    fn derive_configuration() {
        let eds = load_test_eds();
        let original = eds.clone();
        let mut dcf = eds.to_configuration(4, 500, None);

        assert_eq!(dcf.file_info.file_name, "widget.dcf");
        assert_eq!(dcf.file_info.file_revision, 8);
        assert_eq!(dcf.file_info.last_eds.as_deref(), Some("widget.eds"));
        assert_eq!(dcf.device_commissioning.node_name, "Widget_Node4");
        assert_eq!(dcf.resolved_value(0x1400, Some(1)), Ok(Some(0x204)));

        assert!(dcf.object_dictionary.set_parameter_value(0x2000, None, "250"));
        dcf.object_dictionary
            .get_sub_object_mut(0x1018, 1)
            .unwrap()
            .parameter_name
            .push_str(" (changed)");
        dcf.additional_sections
            .get_mut("VendorExtension")
            .unwrap()
            .insert("Mode", "slow");
        dcf.object_dictionary.mandatory_objects.clear();
        assert_eq!(eds, original);

        // the configuration survives a write/load cycle
        let text = dcf.write_to_string();
        assert!(text.contains("[DeviceCommissioning]\nNodeID=4\n"));
        assert!(text.contains("ParameterValue=250\n"));
        let reloaded = load_dcf_from_string(&text, &LoadOptions::default()).unwrap();
        assert_eq!(reloaded.device_commissioning, dcf.device_commissioning);
        assert_eq!(reloaded.object_dictionary, dcf.object_dictionary);
        assert_eq!(reloaded.file_info, dcf.file_info);
        assert_eq!(
            reloaded.object_dictionary.parameter_value(0x2000, None),
            Some("250")
        );
    }

    #[test]
    fn dcf_compact_storage() {
        let text = r#"
[DeviceInfo]
ProductName=Widget

[DeviceCommissioning]
NodeID=0x10

[1600]
ParameterName=RPDO mapping parameter
ObjectType=0x8
DataType=0x0007
AccessType=rw
SubNumber=3

[1600sub0]
ParameterName=Number of entries
DataType=0x0005
AccessType=rw
DefaultValue=2

[1600sub1]
ParameterName=Mapping 1
DataType=0x0007
AccessType=rw
DefaultValue=$NODEID

[1600sub2]
ParameterName=Mapping 2
DataType=0x0007
AccessType=rw

[1600Value]
NrOfEntries=3
1=0x60000108
2=0x60000208
3=0x60000308

[1600Denotation]
NrOfEntries=1
1=first
"#;
        let dcf = load_dcf_from_string(text, &LoadOptions::default()).unwrap();
        let entry = dcf.object_dictionary.get_object(0x1600).unwrap();
        assert_eq!(entry.sub_objects.len(), 3);
        assert_eq!(
            entry.sub_objects[&1].parameter_value.as_deref(),
            Some("0x60000108")
        );
        assert_eq!(entry.sub_objects[&1].denotation.as_deref(), Some("first"));
        assert_eq!(
            entry.sub_objects[&2].parameter_value.as_deref(),
            Some("0x60000208")
        );
        // there is no sub-object 3: the row is dropped
        assert!(!entry.sub_objects.contains_key(&3));
        // the compact storage sections are consumed
        assert!(dcf.additional_sections.is_empty());
        assert_eq!(dcf.resolved_value(0x1600, Some(0)), Ok(Some(2)));
    }

    #[test]
    fn dcf_node_id_formulas() {
        let text = r#"
[DeviceInfo]
ProductName=Widget

[DeviceCommissioning]
NodeID=0x03

[1014]
ParameterName=COB-ID EMCY
DataType=0x0007
AccessType=rw
DefaultValue=$NODEID+0x80
"#;
        let dcf = load_dcf_from_string(text, &LoadOptions::default()).unwrap();
        assert_eq!(dcf.resolved_value(0x1014, None), Ok(Some(0x83)));
    }

    #[test]
    fn decode_errors() {
        let result = load_eds_from_string(
            "[DeviceInfo]\nVendorNumber=0x1FFFFFFFF\n",
            &LoadOptions::default(),
        );
        let Err(EdsError::ParserError { parser_error }) = result else {
            panic!("expected a parser error");
        };
        let message = parser_error.to_string();
        assert!(message.contains("0x1FFFFFFFF"));
        assert!(message.contains("u32"));

        let result = load_eds_from_string("VendorName=ACME\n", &LoadOptions::default());
        assert!(matches!(
            result,
            Err(EdsError::TokenizerError {
                tokenizer_error: TokenizerError::KeyOutsideSection { line: 1, .. }
            })
        ));
    }

    #[test]
    fn literals() {
        assert_eq!(parse_integer::<u16>("", None), Ok(0));
        assert_eq!(parse_integer::<u16>("0x1A", None), Ok(0x1a));
        assert_eq!(parse_integer::<u16>("017", None), Ok(15));
        assert_eq!(parse_integer::<u16>("17", None), Ok(17));
        assert_eq!(parse_integer::<u32>("$nodeid-1", Some(5)), Ok(4));
        assert!(parse_integer::<u8>("256", None).is_err());
        assert!(parse_integer::<u32>("$NODEID+1+1", Some(5)).is_err());
        assert!(parse_bool("yes"));
        assert!(!parse_bool("0"));
    }

    #[test]
    fn files() {
        let dir = tempdir().unwrap();
        let eds_path = dir.path().join("widget.eds");
        std::fs::write(&eds_path, TEST_EDS).unwrap();

        let eds = load_eds(&eds_path, &LoadOptions::default()).unwrap();
        let dcf = eds.to_configuration(2, 250, Some("left drive"));
        let dcf_path = dir.path().join(&dcf.file_info.file_name);
        dcf.write(&dcf_path, Some("configuration of the left drive"))
            .unwrap();

        let text = std::fs::read_to_string(&dcf_path).unwrap();
        assert!(text.starts_with("; configuration of the left drive\n"));
        let reloaded = load_dcf(&dcf_path, &LoadOptions::default()).unwrap();
        assert_eq!(reloaded.device_commissioning.node_name, "left drive");
        assert_eq!(reloaded.object_dictionary, dcf.object_dictionary);

        let options = LoadOptions::default().with_max_input_size(64);
        assert!(matches!(
            load_eds(&eds_path, &options),
            Err(EdsError::FileTooLarge { limit: 64, .. })
        ));
    }
}
